//! @ai:module:intent Validate the installed benchmark tools before running or comparing
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus, MissingTool, Tool
//! @ai:module:stateless true

use crate::config::ToolConfig;
use std::path::PathBuf;

/// @ai:intent External tools driven by the workspace manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Benchmark,
    Compare,
    Exr2Png,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Benchmark, Tool::Compare, Tool::Exr2Png];

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Benchmark => "benchmark",
            Tool::Compare => "compare",
            Tool::Exr2Png => "exr2png",
        }
    }

    /// @ai:intent What stops working when the tool is missing
    /// @ai:effects pure
    fn impact(&self) -> &'static str {
        match self {
            Tool::Benchmark => "'run' is unavailable",
            Tool::Compare => "'results compute' is unavailable",
            Tool::Exr2Png => "PNG previews of results are not generated",
        }
    }

    /// @ai:effects env
    fn executable(&self, tools: &ToolConfig) -> PathBuf {
        match self {
            Tool::Benchmark => tools.benchmark_exec(),
            Tool::Compare => tools.compare_exec(),
            Tool::Exr2Png => tools.exr2png_exec(),
        }
    }
}

/// @ai:intent Status of toolchain validation
#[derive(Debug)]
pub struct ToolchainStatus {
    pub available: Vec<Tool>,
    pub missing_tools: Vec<MissingTool>,
}

impl ToolchainStatus {
    /// @ai:effects pure
    pub fn is_available(&self, tool: Tool) -> bool {
        self.available.contains(&tool)
    }
}

/// @ai:intent Information about a missing tool
#[derive(Debug)]
pub struct MissingTool {
    pub tool: Tool,
    pub path: PathBuf,
}

/// @ai:intent Validates that the benchmark tools are installed
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:intent Check every tool of the workspace settings
    /// @ai:effects fs:read, env
    pub fn validate(tools: &ToolConfig) -> ToolchainStatus {
        let mut available = Vec::new();
        let mut missing_tools = Vec::new();

        for tool in Tool::ALL {
            let path = tool.executable(tools);
            if path.is_file() {
                available.push(tool);
            } else {
                missing_tools.push(MissingTool { tool, path });
            }
        }

        ToolchainStatus {
            available,
            missing_tools,
        }
    }

    /// @ai:intent Log warnings for missing tools
    /// @ai:effects io
    pub fn log_warnings(status: &ToolchainStatus) {
        for missing in &status.missing_tools {
            tracing::warn!(
                "Tool '{}' not found at {}: {}. Set FBKSD_INSTALL_DIR or [tools] in fbksd.toml",
                missing.tool.as_str(),
                missing.path.display(),
                missing.tool.impact()
            );
        }
    }
}
