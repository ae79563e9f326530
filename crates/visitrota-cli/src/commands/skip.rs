use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use crate::common::{service, CliResult};

#[derive(Subcommand)]
pub enum SkipAction {
    /// Record a skip week for a member
    Add {
        group_id: String,
        user_id: String,
        /// Any date in the period to skip (normalized to its Monday)
        period: NaiveDate,
        #[arg(long)]
        reason: Option<String>,
    },
    /// List skip weeks for a group
    List { group_id: String },
}

pub fn run(action: SkipAction) -> CliResult {
    match action {
        SkipAction::Add {
            group_id,
            user_id,
            period,
            reason,
        } => {
            let skip = service()?.record_skip_week(&group_id, &user_id, period, reason, Utc::now())?;
            println!("skip week recorded for {} on {}", skip.user_id, skip.period_start);
        }
        SkipAction::List { group_id } => {
            for skip in service()?.skip_weeks(&group_id) {
                let reason = skip.reason.as_deref().unwrap_or("-");
                println!("{}  {}  {}", skip.period_start, skip.user_id, reason);
            }
        }
    }
    Ok(())
}
