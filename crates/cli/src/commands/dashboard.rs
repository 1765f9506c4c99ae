use std::time::Duration;

use dealdesk_client::load_dashboard;
use dealdesk_core::source::DashboardSource;

use super::{source_failure, CommandResult};

pub async fn run<S>(source: &S, retry_delay: Duration) -> CommandResult
where
    S: DashboardSource + ?Sized,
{
    match load_dashboard(source, retry_delay).await {
        Ok(snapshot) => {
            let data = serde_json::to_value(&snapshot).ok();
            CommandResult::with_data("dashboard", "dashboard snapshot loaded", data)
        }
        Err(error) => source_failure("dashboard", &error),
    }
}
