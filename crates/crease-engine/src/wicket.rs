use crease_types::{Delivery, PlayerId, WicketType};

use crate::effect::DismissalEffect;
use crate::error::{EngineError, EngineResult};
use crate::innings::InningsAggregate;

/// Mark the dismissed batsman out and credit the bowler where the
/// dismissal type allows. Does not touch the crease pointers.
pub(crate) fn dismiss(
    innings: &mut InningsAggregate,
    delivery: &Delivery,
    wicket_type: WicketType,
    dismissed: PlayerId,
) -> EngineResult<()> {
    let bowler = innings.current_bowler;
    let line = innings.batting.get_mut(&dismissed).ok_or_else(|| {
        EngineError::invariant(format!("no batting line for dismissed batsman {dismissed}"))
    })?;

    line.is_out = true;
    line.dismissal_type = Some(wicket_type);
    if wicket_type.credits_bowler() {
        line.dismissed_by = Some(bowler);
    }
    if wicket_type.requires_fielder() {
        line.fielder = delivery.fielder_id;
    }
    innings.total_wickets += 1;
    Ok(())
}

/// Put the incoming batsman in the dismissed player's place, wherever
/// strike rotation left them.
pub(crate) fn replace(
    innings: &mut InningsAggregate,
    dismissed: PlayerId,
    incoming: Option<PlayerId>,
) -> DismissalEffect {
    let Some(incoming) = incoming else {
        return DismissalEffect {
            player: dismissed,
            new_batsman: None,
            new_line_created: false,
        };
    };

    if innings.striker == dismissed {
        innings.striker = incoming;
    } else if innings.non_striker == dismissed {
        innings.non_striker = incoming;
    }
    let new_line_created = innings.ensure_batting_line(incoming);

    DismissalEffect {
        player: dismissed,
        new_batsman: Some(incoming),
        new_line_created,
    }
}
