use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DiceRollRequestDto {
    #[validate(range(min = 2, max = 1000, message = "Die size must be between 2 and 1000"))]
    pub die_size: u32,
    #[serde(default)]
    #[validate(range(min = 1, max = 1000, message = "Count must be between 1 and 1000"))]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiceRollResponseDto {
    pub die_size: u32,
    pub rolls: Vec<u32>,
    pub total: u64,
}

impl DiceRollResponseDto {
    pub fn new(die_size: u32, rolls: Vec<u32>) -> Self {
        let total = rolls.iter().map(|&r| u64::from(r)).sum();
        Self {
            die_size,
            rolls,
            total,
        }
    }
}
