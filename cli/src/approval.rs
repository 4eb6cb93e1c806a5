//! Interactive tool-call approval

use async_trait::async_trait;
use colored::Colorize;
use dialoguer::Confirm;
use relay_core::tools::approval::ApprovalGate;
use serde_json::Value;
use tracing::warn;

/// Asks the operator to confirm each tool call on the terminal.
/// A declined or failed prompt counts as a denial.
pub struct ConsoleApprovalGate;

#[async_trait]
impl ApprovalGate for ConsoleApprovalGate {
    async fn confirm(&self, name: &str, args: &Value) -> bool {
        let prompt = format!(
            "Allow call to {} with arguments {}?",
            name.cyan().bold(),
            serde_json::to_string(args).unwrap_or_else(|_| "<unprintable>".to_string())
        );

        // dialoguer blocks on the terminal; keep it off the runtime
        // threads.
        let result = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact()
        })
        .await;

        match result {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!("Approval prompt failed, denying call: {e}");
                false
            }
            Err(e) => {
                warn!("Approval prompt task panicked, denying call: {e}");
                false
            }
        }
    }
}
