//! Risk posture threaded through propagation and step selection.
//! This module turns the agent's situation into one hazard threshold.
//! It does not score danger itself; that stays with the host's oracle.

use serde::{Deserialize, Serialize};

use crate::world::{AgentStatus, LevelStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Posture {
    #[default]
    Normal,
    /// Fleeing for its life: ignore danger, stay off unknown and occupied squares.
    Desperate,
    /// Moving through the dark without light.
    Lunal,
    /// Diving fast and avoiding fights.
    Munchkin,
    /// Digging an escape corridor.
    Digging,
}

impl Posture {
    pub fn ignores_hazards(self) -> bool {
        !matches!(self, Posture::Normal)
    }

    pub fn avoids_monsters(self) -> bool {
        matches!(self, Posture::Desperate | Posture::Lunal | Posture::Munchkin)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Baseline danger the agent is willing to absorb, in oracle units.
    pub avoidance: u32,
    pub posture: Posture,
    /// The current goal deliberately walks past known monsters.
    pub ignoring_monsters: bool,
}

impl RiskPolicy {
    pub fn new(avoidance: u32) -> Self {
        Self { avoidance, ..Self::default() }
    }

    pub fn with_posture(self, posture: Posture) -> Self {
        Self { posture, ..self }
    }

    /// Boosted bravery: the agent is already past the point where caution helps.
    pub fn is_twitchy(&self, agent: &AgentStatus) -> bool {
        i64::from(self.avoidance) > i64::from(agent.hp)
    }

    pub fn is_desperate(&self) -> bool {
        self.posture == Posture::Desperate
    }

    /// Highest oracle value a square may score and still be walked through.
    /// Later rules override earlier ones.
    pub fn threshold(&self, agent: &AgentStatus, level: &LevelStatus) -> u32 {
        let scaled = |num: u32, den: u32| self.avoidance.saturating_mul(num) / den;
        let mut fear = if agent.max_level == 50 { scaled(5, 10) } else { scaled(3, 10) };
        if level.scary_guy_on_level {
            fear = scaled(2, 1);
        }
        if level.unique_on_level && level.vault_on_level && agent.max_level == 50 {
            fear = scaled(3, 1);
        }
        if level.scary_guy_on_level && agent.level <= 5 {
            fear = scaled(3, 1);
        }
        if self.ignoring_monsters {
            fear = scaled(5, 1);
        }
        if level.turns_on_level > 5000 {
            fear = scaled(25, 1);
        }
        if agent.food == 0 || !agent.has_light {
            fear = scaled(100, 1);
        }
        if agent.in_town() {
            fear = scaled(3, 10);
        }
        fear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_relaxes_with_worse_situations() {
        let policy = RiskPolicy::new(100);
        let agent = AgentStatus::default();
        let mut level = LevelStatus::default();
        assert_eq!(policy.threshold(&agent, &level), 30);

        level.scary_guy_on_level = true;
        assert_eq!(policy.threshold(&agent, &level), 200);

        level.turns_on_level = 6000;
        assert_eq!(policy.threshold(&agent, &level), 2500);

        let starving = AgentStatus { food: 0, ..agent.clone() };
        assert_eq!(policy.threshold(&starving, &level), 10_000);

        let dark = AgentStatus { has_light: false, ..agent.clone() };
        assert_eq!(policy.threshold(&dark, &LevelStatus::default()), 10_000);
    }

    #[test]
    fn town_threshold_wins_over_everything() {
        let policy = RiskPolicy { ignoring_monsters: true, ..RiskPolicy::new(100) };
        let agent = AgentStatus { depth: 0, food: 0, ..AgentStatus::default() };
        assert_eq!(policy.threshold(&agent, &LevelStatus::default()), 30);
    }

    #[test]
    fn twitchy_when_avoidance_exceeds_hp() {
        let agent = AgentStatus { hp: 40, ..AgentStatus::default() };
        assert!(!RiskPolicy::new(40).is_twitchy(&agent));
        assert!(RiskPolicy::new(41).is_twitchy(&agent));
    }

    #[test]
    fn non_normal_postures_ignore_hazards() {
        assert!(!Posture::Normal.ignores_hazards());
        for posture in [Posture::Desperate, Posture::Lunal, Posture::Munchkin, Posture::Digging] {
            assert!(posture.ignores_hazards(), "{posture:?}");
        }
        assert!(!Posture::Digging.avoids_monsters());
    }
}
