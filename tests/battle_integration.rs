//! Battle engine scenarios against scripted battle pages

mod common;

use common::*;
use origins_pilot::battle::{fight, BattleAction, BattlePhase, FightOptions};
use origins_pilot::catalog::{Move, MoveCatalog, MoveClass};
use origins_pilot::core::config::BattlePolicy;
use origins_pilot::core::error::PilotError;
use origins_pilot::core::types::{CombatantId, Coord, EncounterId, ItemId, MoveId};
use origins_pilot::session::routes;

const TARGET: EncounterId = EncounterId(77);

fn catalog() -> MoveCatalog {
    let mv = |id: u32, power: u32, accuracy: u8| Move {
        id: MoveId(id),
        name: format!("Attaque {}", id),
        category: "Normal".into(),
        power,
        accuracy,
        class: MoveClass::Physical,
    };
    // Scores: 90, 125, 50
    [mv(1, 40, 100), mv(2, 90, 70), mv(3, 0, 100)]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_attacks_with_best_move_until_won() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 100).moves(&[1, 2, 3]))
        .post(routes::BATTLE, BattlePage::new(12, 70, 40).moves(&[1, 2, 3]))
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert!(report.began);
    assert!(report.won());
    assert_eq!(report.turns, 2);
    assert_eq!(
        report.actions,
        vec![
            BattleAction::Attack(MoveId(2)),
            BattleAction::Attack(MoveId(2))
        ]
    );

    let engage = &session.transport().requests()[0];
    assert_eq!(engage.param("adversaire"), Some("77"));
    let first_attack = &session.transport().requests()[1];
    assert_eq!(first_attack.param("attaque"), Some("2"));
}

#[tokio::test]
async fn test_critical_life_switches_instead_of_healing() {
    // Life 15% against 60%, one unused reserve, potions in stock
    let transport = ScriptedTransport::new()
        .get(
            routes::BATTLE,
            BattlePage::new(12, 50, 100).switchable(&[12, 34]),
        )
        .post(
            routes::BATTLE,
            BattlePage::new(12, 15, 60)
                .items(&[(10, 3)])
                .switchable(&[12, 34]),
        )
        .post(routes::BATTLE, BattlePage::new(34, 90, 60).switchable(&[12]))
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert!(report.won());
    assert_eq!(
        report.actions,
        vec![
            BattleAction::Attack(MoveId(1)),
            BattleAction::Switch(CombatantId(34)),
            BattleAction::Attack(MoveId(1)),
        ]
    );
    assert_eq!(report.switches(), 1);
}

#[tokio::test]
async fn test_low_life_against_weaker_opponent_heals() {
    // Life 15% but the opponent is at 10%: no switch, heal instead
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 50, 40).switchable(&[34]))
        .post(
            routes::BATTLE,
            BattlePage::new(12, 15, 10)
                .items(&[(10, 0), (11, 2)])
                .switchable(&[34]),
        )
        .post(routes::BATTLE, BattlePage::new(12, 45, 10).switchable(&[34]))
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert!(report.won());
    assert_eq!(
        report.actions,
        vec![
            BattleAction::Attack(MoveId(1)),
            BattleAction::UseItem(ItemId(11)),
            BattleAction::Attack(MoveId(1)),
        ]
    );
}

#[tokio::test]
async fn test_no_reserve_left_flees() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 50, 100))
        .post(routes::BATTLE, BattlePage::new(12, 10, 90))
        .post(routes::BATTLE, FLEE_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, BattlePhase::EndedLost);
    assert_eq!(
        report.actions,
        vec![BattleAction::Attack(MoveId(1)), BattleAction::Flee]
    );
    assert_eq!(
        session.transport().actions(routes::BATTLE),
        vec!["attaque", "fuite"]
    );
}

#[tokio::test]
async fn test_failed_capture_without_items_falls_back_to_attack() {
    // Life 30%, opponent 10%, a single tier-1 ball
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 30, 10).items(&[(1, 1)]))
        .post(
            routes::BATTLE,
            BattlePage::new(12, 30, 10)
                .items(&[(1, 0)])
                .message(CAPTURE_FAILED),
        )
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::capture(TARGET),
    )
    .await
    .unwrap();

    assert_eq!(
        report.actions,
        vec![
            BattleAction::Capture(ItemId(1)),
            BattleAction::Attack(MoveId(1))
        ]
    );
    assert_eq!(report.capture_attempts, 1);
    assert!(!report.captured);
    assert!(report.won());
}

#[tokio::test]
async fn test_capture_picks_first_tier_in_stock() {
    let transport = ScriptedTransport::new()
        .get(
            routes::BATTLE,
            BattlePage::new(12, 80, 20).items(&[(1, 0), (2, 2), (3, 0)]),
        )
        .post(routes::BATTLE, CAPTURED_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::capture(TARGET),
    )
    .await
    .unwrap();

    assert!(report.captured);
    assert!(report.won());
    assert_eq!(report.actions, vec![BattleAction::Capture(ItemId(2))]);
    assert_eq!(session.transport().requests()[1].param("objet"), Some("2"));
}

#[tokio::test]
async fn test_capture_retries_move_down_the_tiers() {
    let policy = BattlePolicy::default();
    let failed = || {
        BattlePage::new(12, 80, 20)
            .items(&[(1, 1), (2, 1)])
            .message(CAPTURE_FAILED)
    };
    let transport = ScriptedTransport::new()
        .get(
            routes::BATTLE,
            BattlePage::new(12, 80, 20).items(&[(1, 1), (2, 1)]),
        )
        .post(routes::BATTLE, failed())
        .post(routes::BATTLE, CAPTURED_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &policy,
        &FightOptions::capture(TARGET),
    )
    .await
    .unwrap();

    // Quantities are tracked locally: tier 1 is spent after one throw
    assert_eq!(
        report.actions,
        vec![
            BattleAction::Capture(ItemId(1)),
            BattleAction::Capture(ItemId(2))
        ]
    );
    assert!(report.captured);
    assert_eq!(report.turns, 1);
}

#[tokio::test]
async fn test_capture_waits_for_threshold() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 90).items(&[(1, 5)]))
        .post(routes::BATTLE, BattlePage::new(12, 80, 25).items(&[(1, 5)]))
        .post(routes::BATTLE, CAPTURED_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::capture(TARGET),
    )
    .await
    .unwrap();

    assert_eq!(
        report.actions,
        vec![
            BattleAction::Attack(MoveId(1)),
            BattleAction::Capture(ItemId(1))
        ]
    );
    assert!(report.captured);
}

#[tokio::test]
async fn test_opponent_fled_is_final() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 50))
        .post(routes::BATTLE, FLED_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, BattlePhase::EndedFled);
    assert!(!report.won() && !report.captured);
    assert_eq!(session.transport().count(Method::Post, routes::BATTLE), 1);
}

#[tokio::test]
async fn test_continuation_after_one_opponent_down() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 10))
        .post(
            routes::BATTLE,
            BattlePage::new(12, 75, 0).message(OPPONENT_FAINTED),
        )
        .post(routes::BATTLE, BattlePage::new(12, 75, 100))
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert!(report.won());
    assert_eq!(
        session.transport().actions(routes::BATTLE),
        vec!["attaque", "suivant", "attaque"]
    );
}

#[tokio::test]
async fn test_begin_rejects_page_without_usable_move() {
    let transport =
        ScriptedTransport::new().get(routes::BATTLE, BattlePage::new(12, 80, 100).moves(&[]));
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert!(!report.began);
    assert_eq!(report.outcome, BattlePhase::NotInBattle);
    assert_eq!(session.transport().count(Method::Post, routes::BATTLE), 0);
}

#[tokio::test]
async fn test_begin_rejects_vanished_target() {
    let transport = ScriptedTransport::new().get(routes::BATTLE, TARGET_GONE_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();
    assert!(!report.began);
}

#[tokio::test]
async fn test_target_gone_mid_battle_is_unrecoverable() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 100))
        .post(routes::BATTLE, TARGET_GONE_PAGE);
    let mut session = session(transport);

    let result = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await;
    assert!(matches!(result, Err(PilotError::Unrecoverable(_))));
}

#[tokio::test]
async fn test_transport_failure_aborts_battle() {
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 100))
        .post_fails(routes::BATTLE);
    let mut session = session(transport);

    let result = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET),
    )
    .await;
    assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_relocates_before_engaging() {
    let spot = Coord::new(4, 9);
    let transport = ScriptedTransport::new()
        .get(routes::MOVE, "<p>Déplacement...</p>")
        .get(routes::MAP, map_page(spot, &[77]))
        .get(routes::BATTLE, BattlePage::new(12, 80, 100))
        .post(routes::BATTLE, WON_PAGE);
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET).at(spot),
    )
    .await
    .unwrap();

    assert!(report.won());
    let relocation = &session.transport().requests()[0];
    assert_eq!(relocation.path, routes::MOVE);
    assert_eq!(relocation.param("horizontal"), Some("4"));
    assert_eq!(relocation.param("vertical"), Some("9"));
}

#[tokio::test]
async fn test_failed_relocation_does_not_engage() {
    let transport = ScriptedTransport::new()
        .get(routes::MOVE, "<p>Déplacement...</p>")
        .get(routes::MAP, map_page(Coord::new(0, 0), &[]));
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &BattlePolicy::default(),
        &FightOptions::kill(TARGET).at(Coord::new(4, 9)),
    )
    .await
    .unwrap();

    assert!(!report.began);
    assert_eq!(session.transport().count(Method::Get, routes::BATTLE), 0);
}

#[tokio::test]
async fn test_endless_battle_is_abandoned() {
    let policy = BattlePolicy {
        max_turns: 3,
        ..BattlePolicy::default()
    };
    let transport = ScriptedTransport::new()
        .get(routes::BATTLE, BattlePage::new(12, 80, 100))
        .always_post(routes::BATTLE, BattlePage::new(12, 80, 100).html());
    let mut session = session(transport);

    let report = fight(
        &mut session,
        &catalog(),
        &policy,
        &FightOptions::kill(TARGET),
    )
    .await
    .unwrap();

    assert_eq!(report.turns, 3);
    assert_eq!(report.outcome, BattlePhase::EndedLost);
    assert_eq!(report.actions.last(), Some(&BattleAction::Flee));
}
