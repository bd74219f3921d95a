//! A scripted player for headless runs.
//!
//! Collects every orb on the field and builds a fixed defensive line one
//! defender at a time: a generator at the back of each row, then a single
//! shooter, then a double shooter.

use greenline_core::commands::PlayerCommand;
use greenline_core::config::Tuning;
use greenline_core::enums::{DefenderKind, SessionPhase};
use greenline_core::state::SessionSnapshot;

/// Column layout of the line, back to front.
const LINE: [DefenderKind; 3] = [
    DefenderKind::Generator,
    DefenderKind::Shooter1,
    DefenderKind::Shooter2,
];

/// Commands to send in response to `snapshot`.
pub fn plan(snapshot: &SessionSnapshot, tuning: &Tuning) -> Vec<PlayerCommand> {
    if snapshot.phase != SessionPhase::Running {
        return Vec::new();
    }

    let mut commands: Vec<PlayerCommand> = snapshot
        .orbs
        .iter()
        .map(|orb| PlayerCommand::PickupOrb { orb: orb.id })
        .collect();

    if let Some((row, column, kind)) = next_slot(snapshot, tuning) {
        if tuning.cost(kind) <= snapshot.sun_balance {
            commands.push(PlayerCommand::PlaceDefender { row, column, kind });
        }
    }
    commands
}

/// First unbuilt cell of the line, filling each column across all rows
/// before moving forward.
fn next_slot(snapshot: &SessionSnapshot, tuning: &Tuning) -> Option<(usize, usize, DefenderKind)> {
    let columns = LINE.len().min(tuning.field.columns);
    (0..columns)
        .flat_map(|column| (0..tuning.field.rows).map(move |row| (row, column)))
        .find(|&(row, column)| {
            !snapshot
                .defenders
                .iter()
                .any(|d| d.row == row && d.column == column)
        })
        .map(|(row, column)| (row, column, LINE[column]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use greenline_core::config::GameConfig;
    use greenline_core::enums::OrbMotion;
    use greenline_core::state::{DefenderView, OrbView};
    use greenline_core::types::EntityId;

    fn tuning() -> Tuning {
        GameConfig::standard().validate().unwrap()
    }

    fn running(balance: u32) -> SessionSnapshot {
        SessionSnapshot {
            phase: SessionPhase::Running,
            sun_balance: balance,
            ..Default::default()
        }
    }

    fn defender(row: usize, column: usize) -> DefenderView {
        DefenderView {
            id: EntityId((row * 10 + column) as u64 + 1),
            kind: LINE[column],
            row,
            column,
            health: 1.0,
            max_health: 1.0,
        }
    }

    #[test]
    fn test_idle_unless_running() {
        let mut snapshot = running(500);
        snapshot.phase = SessionPhase::Paused;
        assert!(plan(&snapshot, &tuning()).is_empty());
    }

    #[test]
    fn test_collects_every_orb() {
        let mut snapshot = running(0);
        for id in [4, 9] {
            snapshot.orbs.push(OrbView {
                id: EntityId(id),
                position: DVec2::ZERO,
                target: DVec2::ZERO,
                motion: OrbMotion::Fall,
                remaining_secs: 1.0,
            });
        }
        let commands = plan(&snapshot, &tuning());
        assert_eq!(
            commands,
            vec![
                PlayerCommand::PickupOrb { orb: EntityId(4) },
                PlayerCommand::PickupOrb { orb: EntityId(9) },
            ]
        );
    }

    #[test]
    fn test_fills_back_column_first() {
        let tuning = tuning();
        let mut snapshot = running(25);
        assert_eq!(
            plan(&snapshot, &tuning),
            vec![PlayerCommand::PlaceDefender {
                row: 0,
                column: 0,
                kind: DefenderKind::Generator
            }]
        );

        snapshot.defenders = (0..tuning.field.rows).map(|row| defender(row, 0)).collect();
        assert_eq!(
            plan(&snapshot, &tuning),
            vec![PlayerCommand::PlaceDefender {
                row: 0,
                column: 1,
                kind: DefenderKind::Shooter1
            }]
        );
    }

    #[test]
    fn test_waits_for_sun() {
        let tuning = tuning();
        let mut snapshot = running(49);
        snapshot.defenders = (0..tuning.field.rows)
            .flat_map(|row| [defender(row, 0), defender(row, 1)])
            .collect();
        assert!(plan(&snapshot, &tuning).is_empty());

        snapshot.sun_balance = 50;
        assert_eq!(plan(&snapshot, &tuning).len(), 1);
    }

    #[test]
    fn test_nothing_left_to_build() {
        let tuning = tuning();
        let mut snapshot = running(1000);
        snapshot.defenders = (0..tuning.field.rows)
            .flat_map(|row| (0..LINE.len()).map(move |column| defender(row, column)))
            .collect();
        assert!(plan(&snapshot, &tuning).is_empty());
    }
}
