use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use crate::common::{service, CliResult};

#[derive(Subcommand)]
pub enum RotationAction {
    /// List rotations for a group
    List {
        group_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reassign one period's rotation to another user
    Swap {
        group_id: String,
        /// The rotation's period (any date in that week)
        period: NaiveDate,
        /// Current assignee
        #[arg(long)]
        from: String,
        /// Replacement assignee
        #[arg(long)]
        to: String,
    },
    /// Cancel a rotation and delete its calendar event
    Cancel { rotation_id: String },
    /// Mark a rotation's visit as completed
    Complete { rotation_id: String },
}

pub async fn run(action: RotationAction) -> CliResult {
    match action {
        RotationAction::List { group_id, json } => {
            let rotations = service()?.rotations(&group_id);
            if json {
                println!("{}", serde_json::to_string_pretty(&rotations)?);
            } else {
                for rotation in rotations {
                    println!(
                        "{}  {}  {}  {:?}",
                        rotation.id, rotation.period_start, rotation.assigned_user_id, rotation.status
                    );
                }
            }
        }
        RotationAction::Swap {
            group_id,
            period,
            from,
            to,
        } => {
            let rotation = service()?.swap(&group_id, period, &from, &to, Utc::now()).await?;
            println!(
                "rotation {} for {} reassigned to {}",
                rotation.id, rotation.period_start, rotation.assigned_user_id
            );
        }
        RotationAction::Cancel { rotation_id } => {
            service()?.cancel_rotation(&rotation_id).await?;
            println!("rotation {rotation_id} cancelled");
        }
        RotationAction::Complete { rotation_id } => {
            let rotation = service()?.mark_completed(&rotation_id)?;
            println!("rotation {} marked completed", rotation.id);
        }
    }
    Ok(())
}
