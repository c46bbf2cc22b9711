//! Dice rolling routes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::dto::{DiceRollRequestDto, DiceRollResponseDto};
use crate::application::services::dice;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::ValidatedJson;
use crate::infrastructure::state::AppState;

/// Roll `count` dice of `die_size` faces (one die when `count` is omitted)
pub async fn roll_dice(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<DiceRollRequestDto>,
) -> Result<Json<DiceRollResponseDto>, ApiError> {
    let rng = state.random.as_ref();
    let rolls = match req.count {
        Some(count) => dice::roll_many(rng, req.die_size, count)?,
        None => vec![dice::roll_die(rng, req.die_size)?],
    };
    Ok(Json(DiceRollResponseDto::new(req.die_size, rolls)))
}
