use chrono::Utc;
use clap::Subcommand;
use visitrota_core::VisitSchedule;

use crate::common::{service, CliResult};

#[derive(Subcommand)]
pub enum GroupAction {
    /// Create a rotation group
    Create {
        name: String,
        /// Visit day of week (0 = Monday .. 6 = Sunday)
        #[arg(long, default_value_t = 0)]
        day: u8,
        /// Visit start time (HH:MM)
        #[arg(long, default_value = "10:00")]
        time: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a member at a rotation position
    AddMember {
        group_id: String,
        user_id: String,
        /// Position in the rotation order (unique within the group)
        #[arg(long)]
        position: u32,
    },
    /// Remove a member and prune their future rotations
    RemoveMember { group_id: String, user_id: String },
    /// Activate or archive a group
    SetActive {
        group_id: String,
        /// true to activate, false to archive
        active: bool,
    },
    /// List groups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: GroupAction) -> CliResult {
    match action {
        GroupAction::Create {
            name,
            day,
            time,
            description,
        } => {
            let schedule = VisitSchedule {
                day_of_week: day,
                time_of_day: time,
            };
            let group = service()?.create_group(&name, description, schedule, Utc::now())?;
            println!("group created: {} ({})", group.name, group.id);
        }
        GroupAction::AddMember {
            group_id,
            user_id,
            position,
        } => {
            service()?.add_member(&group_id, &user_id, position)?;
            println!("member added at position {position}");
        }
        GroupAction::RemoveMember { group_id, user_id } => {
            let today = Utc::now().date_naive();
            let summary = service()?.remove_member(&group_id, &user_id, today).await?;
            println!(
                "member removed; {} future rotation(s) pruned, {} calendar event(s) left behind",
                summary.removed_rotations, summary.failed_event_deletes
            );
        }
        GroupAction::SetActive { group_id, active } => {
            service()?.set_group_active(&group_id, active)?;
            println!(
                "group {group_id} {}",
                if active { "activated" } else { "archived" }
            );
        }
        GroupAction::List { json } => {
            let groups = service()?.groups();
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                for group in groups {
                    println!(
                        "{}  {}  ({} member(s), cursor {})",
                        group.id,
                        group.name,
                        group.members.len(),
                        group.cursor
                    );
                }
            }
        }
    }
    Ok(())
}
