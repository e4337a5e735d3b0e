// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vendra doctor` command implementation.
//!
//! Health-checks the wired adapters and prints one line per adapter.
//! The binary ships with the in-memory reference backend; a production
//! embedding would register its own `ActionClient` and
//! `RealtimeChannel` here.

use colored::Colorize;

use vendra_core::VendraError;
use vendra_core::traits::ServiceAdapter;
use vendra_core::types::HealthStatus;
use vendra_test_utils::MemoryBackend;

fn print_status(adapter: &dyn ServiceAdapter, status: &HealthStatus) {
    let rendered = match status {
        HealthStatus::Healthy => "healthy".green(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}").yellow(),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}").red(),
    };
    println!(
        "  {} v{} ... {rendered}",
        adapter.name().bold(),
        adapter.version()
    );
}

pub async fn run() -> Result<(), VendraError> {
    println!("{}", "vendra doctor".bold());

    let backend = MemoryBackend::new();
    let actions = backend.actions();
    let realtime = backend.realtime();
    let adapters: [&dyn ServiceAdapter; 2] = [actions.as_ref(), realtime.as_ref()];

    for adapter in adapters {
        let status = adapter.health_check().await?;
        print_status(adapter, &status);
    }

    Ok(())
}
