use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use crate::common::{service, CliResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Schedule rotations for consecutive periods
    Run {
        group_id: String,
        /// Number of periods to schedule
        #[arg(long, default_value_t = 1)]
        periods: u32,
        /// First period (any date in that week; normalized to its Monday)
        #[arg(long)]
        start: NaiveDate,
    },
}

pub async fn run(action: ScheduleAction) -> CliResult {
    match action {
        ScheduleAction::Run {
            group_id,
            periods,
            start,
        } => {
            match service()?
                .schedule_rotations(&group_id, periods, start, Utc::now())
                .await
            {
                Ok(rotations) => {
                    for rotation in &rotations {
                        println!("{}  ->  {}", rotation.period_start, rotation.assigned_user_id);
                    }
                    println!("{} rotation(s) scheduled", rotations.len());
                }
                Err(batch) => {
                    // Partially applied: report what stands before failing.
                    for rotation in &batch.applied {
                        println!("{}  ->  {}", rotation.period_start, rotation.assigned_user_id);
                    }
                    return Err(batch.into());
                }
            }
        }
    }
    Ok(())
}
