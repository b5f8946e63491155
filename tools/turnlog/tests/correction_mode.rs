use turnlog::action::correction::{
    CashCorrectionAction, CorrectionModeAction, OperatingCostAction,
};
use turnlog::action::ordinary::StartCompanyAction;
use turnlog::action::Action;
use turnlog::errors::TurnlogError;
use turnlog::game::ruleset::{BasicCatalog, BasicRuleset, RulesetCatalog};
use turnlog::game::{Game, GameController, Processed};
use turnlog::types::{CashHolder, CorrectionType, OperatingCostKind, ReplayMode};

fn game() -> Game {
    BasicCatalog::default()
        .create_game(BasicRuleset::snapshot(&["Alice", "Bob"]))
        .expect("game")
}

fn toggle(game: &mut Game, player: &str, kind: CorrectionType) {
    let active = game.corrections().is_active(kind);
    let action = CorrectionModeAction::new(player, kind, active).expect("supported");
    game.apply_action(&Action::CorrectionMode(action), ReplayMode::Live)
        .expect("toggle");
}

#[test]
fn toggle_pairs_restore_the_original_mode() {
    let mut game = game();
    for kind in [
        CorrectionType::CashCorrection,
        CorrectionType::ClosePrivate,
        CorrectionType::OperatingCost,
    ] {
        toggle(&mut game, "Alice", kind);
        assert!(game.corrections().is_active(kind));
        toggle(&mut game, "Alice", kind);
        assert!(!game.corrections().is_active(kind));
    }
    assert_eq!(game.action_log().len(), 6);
    assert_eq!(game.report().notices().len(), 6);
}

#[test]
fn stale_toggle_template_is_not_allowed() {
    let mut game = game();
    toggle(&mut game, "Alice", CorrectionType::CashCorrection);
    let stale = CorrectionModeAction::new("Alice", CorrectionType::CashCorrection, false)
        .expect("supported");
    assert!(matches!(
        game.apply_action(&Action::CorrectionMode(stale), ReplayMode::Live),
        Err(TurnlogError::ActionNotAllowed(_))
    ));
}

#[test]
fn map_correction_cannot_be_constructed_live() {
    assert!(matches!(
        CorrectionModeAction::new("Alice", CorrectionType::MapCorrection, false),
        Err(TurnlogError::NotSupported(_))
    ));
}

#[test]
fn cash_bounds_follow_holder_balance() {
    let mut game = game();
    toggle(&mut game, "Alice", CorrectionType::CashCorrection);
    let template = CashCorrectionAction::template("Alice", CashHolder::Player("Bob".into()), 600);

    let overdraw = Action::CashCorrection(template.clone().with_amount(-650));
    assert!(matches!(
        game.process(&overdraw, ReplayMode::Live).expect("processed"),
        Processed::Rejected(_)
    ));
    assert!(matches!(
        game.apply_action(&overdraw, ReplayMode::Live),
        Err(TurnlogError::ActionRejected(_))
    ));
    assert_eq!(game.state().player("Bob").map(|p| p.cash), Some(600));

    let drain = Action::CashCorrection(template.with_amount(-600));
    game.apply_action(&drain, ReplayMode::Live).expect("drain");
    assert_eq!(game.state().player("Bob").map(|p| p.cash), Some(0));

    // Bob's template bound moved with his balance.
    let offered = game.possible_actions();
    assert!(offered.contains(&Action::CashCorrection(CashCorrectionAction::template(
        "Alice",
        CashHolder::Player("Bob".into()),
        0
    ))));
}

#[test]
fn operating_cost_is_offered_once_a_company_floats() {
    let mut game = game();
    toggle(&mut game, "Alice", CorrectionType::OperatingCost);
    assert!(!game
        .possible_actions()
        .iter()
        .any(|a| matches!(a, Action::OperatingCost(_))));

    let start = StartCompanyAction::template("Alice", "B&O", 67, 100).with_par(67);
    game.apply_action(&Action::StartCompany(start), ReplayMode::Live)
        .expect("start");
    let treasury = game.state().company("B&O").map(|c| c.cash).unwrap_or_default();
    assert_eq!(treasury, 670);

    let tile = OperatingCostAction::template("Bob", "B&O", OperatingCostKind::LayTile, 20, 670, true);
    assert!(game
        .possible_actions()
        .contains(&Action::OperatingCost(tile.clone())));
    let bank = game.state().bank_cash;
    game.apply_action(&Action::OperatingCost(tile.with_chosen(120)), ReplayMode::Live)
        .expect("cost");
    assert_eq!(game.state().company("B&O").map(|c| c.cash), Some(550));
    assert_eq!(game.state().bank_cash, bank + 120);
}

#[test]
fn oversized_cash_amount_is_rejected_not_applied() {
    let mut game = game();
    toggle(&mut game, "Alice", CorrectionType::CashCorrection);
    let huge = Action::CashCorrection(
        CashCorrectionAction::template("Alice", CashHolder::Player("Alice".into()), 600)
            .with_amount(i64::MAX),
    );
    assert!(matches!(
        game.apply_action(&huge, ReplayMode::Live),
        Err(TurnlogError::ActionRejected(_))
    ));
    assert_eq!(game.state().player("Alice").map(|p| p.cash), Some(600));
    assert_eq!(game.action_log().len(), 1);
}
