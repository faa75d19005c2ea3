// Server status tool

use crate::context::ToolContext;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, Tool, ToolRegistry};
use anyhow::Result;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{ProcessesToUpdate, System};
use tracing::info;

pub const SERVICE_NAME: &str = "CourtListener MCP Server";

/// Health, process metrics and runtime settings.
pub struct StatusTool {
    ctx: Arc<ToolContext>,
    tools_available: usize,
}

impl StatusTool {
    pub fn new(ctx: Arc<ToolContext>, tools_available: usize) -> Self {
        Self {
            ctx,
            tools_available,
        }
    }
}

/// `HH:MM:SS`; hours keep counting past 24.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn in_container() -> bool {
    Path::new("/.dockerenv").exists()
}

/// Resident memory in MB and CPU percent for this process. CPU usage is a
/// delta between two refreshes, so this samples over sysinfo's minimum
/// update interval.
async fn process_metrics() -> (f64, f64) {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return (0.0, 0.0);
    };
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match system.process(pid) {
        Some(process) => {
            let memory_mb = process.memory() as f64 / 1024.0 / 1024.0;
            (round1(memory_mb), round1(process.cpu_usage() as f64))
        }
        None => (0.0, 0.0),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait::async_trait]
impl Tool for StatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "status".to_string(),
            description: "Check the status of the CourtListener MCP server: health, uptime, \
                          memory and CPU use, and the upstream APIs it talks to."
                .to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult> {
        info!("Status check requested");
        let runtime = &self.ctx.runtime;
        let docker = in_container();
        let (memory_mb, cpu_percent) = process_metrics().await;

        let status = json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "environment": {
                "runtime": if docker { "docker" } else { "native" },
                "docker": docker,
                "name": runtime.environment,
                "os": std::env::consts::OS,
                "arch": std::env::consts::ARCH,
            },
            "system": {
                "process_uptime": format_uptime(runtime.started_at.elapsed()),
                "memory_mb": memory_mb,
                "cpu_percent": cpu_percent,
            },
            "server": {
                "tools_available": self.tools_available,
                "transport": runtime.transport,
                "api_base": self.ctx.courtlistener.base_url(),
                "ecfr_base": self.ctx.ecfr.base_url(),
                "host": runtime.host,
                "port": runtime.port,
                "api_key_configured": self.ctx.courtlistener.has_api_key(),
            },
        });
        Ok(CallToolResult::json(&status))
    }
}

/// Register the status tool; it counts itself among the available tools.
pub fn register(registry: &mut ToolRegistry, ctx: &Arc<ToolContext>) {
    let count = registry.len() + usize::from(!registry.contains("status"));
    registry.register(Arc::new(StatusTool::new(ctx.clone(), count)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::context;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(3723)), "01:02:03");
        assert_eq!(format_uptime(Duration::from_secs(90_000)), "25:00:00");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cpu_sampled_across_refreshes() {
        let busy = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let flag = busy.clone();
        let spinner = std::thread::spawn(move || {
            let mut n: u64 = 0;
            while flag.load(std::sync::atomic::Ordering::Relaxed) {
                n = std::hint::black_box(n.wrapping_add(1));
            }
        });

        let (memory_mb, cpu_percent) = process_metrics().await;
        busy.store(false, std::sync::atomic::Ordering::Relaxed);
        spinner.join().unwrap();

        assert!(memory_mb > 0.0);
        assert!(cpu_percent > 0.0, "cpu_percent = {}", cpu_percent);
    }

    #[tokio::test]
    async fn test_status_shape() {
        let tool = StatusTool::new(Arc::new(context("http://127.0.0.1:9/")), 30);
        let result = tool.execute(Value::Null).await.unwrap();
        let value: Value = serde_json::from_str(&result.text_content()).unwrap();

        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], SERVICE_NAME);
        assert_eq!(value["server"]["tools_available"], 30);
        assert_eq!(value["server"]["api_base"], "http://127.0.0.1:9/");
        assert!(value["system"]["process_uptime"].as_str().unwrap().len() >= 8);
        assert!(value["system"]["memory_mb"].is_number());
    }
}
