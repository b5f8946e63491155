//! Ordinary rule actions of the "18XX-basic" ruleset.

use super::context::ApplyContext;
use super::ruleset::{MAX_PAR, MIN_PAR};
use super::state::GameState;
use crate::action::ordinary::{BuyPrivateAction, NullAction, StartCompanyAction};
use crate::action::Action;
use crate::correction::Execution;
use crate::report::money;
use crate::types::{CashHolder, NullMode};

/// Choices open to the current player.
pub fn rule_templates(state: &GameState) -> Vec<Action> {
    let Some(player) = state.players.get(state.current_player) else {
        return Vec::new();
    };
    let mut templates = vec![Action::Null(NullAction::new(&player.name, NullMode::Pass))];
    for private in &state.privates {
        if private.owner.is_none() && !private.closed && player.cash >= private.face_value {
            templates.push(Action::BuyPrivate(BuyPrivateAction::new(
                &player.name,
                &private.id,
                private.face_value,
            )));
        }
    }
    if player.cash >= 2 * MIN_PAR {
        let max_par = MAX_PAR.min(player.cash / 2);
        for company in state.companies.iter().filter(|c| !c.floated && !c.closed) {
            templates.push(Action::StartCompany(StartCompanyAction::template(
                &player.name,
                &company.id,
                MIN_PAR,
                max_par,
            )));
        }
    }
    templates
}

pub fn execute(action: &Action, ctx: &mut ApplyContext<'_>) -> Execution {
    let outcome = match action {
        Action::Null(action) => {
            if action.mode == NullMode::Pass {
                ctx.message("PlayerPasses", &[&action.base.player]);
            }
            Execution::Applied
        }
        Action::BuyPrivate(action) => buy_private(action, ctx),
        Action::StartCompany(action) => start_company(action, ctx),
        _ => Execution::Unhandled,
    };
    if outcome == Execution::Applied {
        ctx.state.advance_turn();
    }
    outcome
}

fn rejected(ctx: &mut ApplyContext<'_>, reason: String) -> Execution {
    ctx.report.add_error(reason.clone());
    Execution::Rejected(reason)
}

fn buy_private(action: &BuyPrivateAction, ctx: &mut ApplyContext<'_>) -> Execution {
    let player = &action.base.player;
    let available = match ctx.resolve_private(&action.private_id) {
        Ok(private) => private.owner.is_none() && !private.closed,
        Err(err) => return rejected(ctx, err.to_string()),
    };
    if !available {
        return rejected(ctx, format!("private {} is not for sale", action.private_id));
    }
    let holder = CashHolder::Player(player.clone());
    if let Err(err) = ctx.state.move_cash_with_bank(&holder, -action.price) {
        return rejected(ctx, err.to_string());
    }
    if let Some(private) = ctx.state.private_mut(&action.private_id) {
        private.owner = Some(player.clone());
    }
    if let Some(buyer) = ctx.state.player_mut(player) {
        buyer.privates.push(action.private_id.clone());
    }
    ctx.message(
        "BuysPrivate",
        &[player, &action.private_id, &money(action.price)],
    );
    Execution::Applied
}

fn start_company(action: &StartCompanyAction, ctx: &mut ApplyContext<'_>) -> Execution {
    let player = &action.base.player;
    let Some(par) = action.par_price else {
        return rejected(ctx, format!("no par price chosen for {}", action.company));
    };
    if par < action.min_par || par > action.max_par {
        return rejected(
            ctx,
            format!(
                "par {par} outside {}..={} for {}",
                action.min_par, action.max_par, action.company
            ),
        );
    }
    let startable = match ctx.resolve_company(&action.company) {
        Ok(company) => !company.floated && !company.closed,
        Err(err) => return rejected(ctx, err.to_string()),
    };
    if !startable {
        return rejected(ctx, format!("{} has already started", action.company));
    }
    let cash = match ctx.resolve_participant(player) {
        Ok(participant) => participant.cash,
        Err(err) => return rejected(ctx, err.to_string()),
    };
    if cash < 2 * par {
        return rejected(
            ctx,
            format!("{player} cannot pay {} for {}", money(2 * par), action.company),
        );
    }

    if let Err(err) = ctx
        .state
        .move_cash_with_bank(&CashHolder::Player(player.clone()), -2 * par)
    {
        return rejected(ctx, err.to_string());
    }
    if let Some(company) = ctx.state.company_mut(&action.company) {
        company.floated = true;
        company.president = Some(player.clone());
        company.par_price = Some(par);
    }
    if let Err(err) = ctx
        .state
        .move_cash_with_bank(&CashHolder::Company(action.company.clone()), 10 * par)
    {
        return rejected(ctx, err.to_string());
    }
    ctx.message("StartsCompany", &[player, &action.company, &par]);
    Execution::Applied
}
