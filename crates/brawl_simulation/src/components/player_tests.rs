//! Тесты Player: hurt, блок, cooldown

#[cfg(test)]
mod tests {
    use super::super::player::*;
    use crate::config::CombatTuning;

    fn blocking_player() -> Player {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        player.change_state(FighterState::Block);
        player
    }

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new(Side::Right, &CombatTuning::default());

        assert_eq!(player.state, FighterState::Standing);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.defence_level, 0);
        assert_eq!(player.facing(), -1.0);
        // Никакого cooldown на старте (даже при now = 0)
        assert!(player.can_act(0.0));
    }

    #[test]
    fn test_cooldown_is_monotonic() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());

        player.extend_cooldown(1.0, 1.0);
        assert_eq!(player.action_timeout_until, 2.0);

        // Более короткий timeout не укорачивает lock
        player.extend_cooldown(1.2, 0.1);
        assert_eq!(player.action_timeout_until, 2.0);

        assert!(!player.can_act(2.0)); // строго now > until
        assert!(player.can_act(2.01));
    }

    #[test]
    fn test_block_raises_defence_and_resets_on_change() {
        let mut player = blocking_player();
        assert_eq!(player.defence_level, 10);

        let change = player.change_state(FighterState::Standing).unwrap();
        assert_eq!(change.from, FighterState::Block);
        assert_eq!(change.to, FighterState::Standing);
        assert_eq!(player.defence_level, 0);
    }

    #[test]
    fn test_same_state_is_not_a_change() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        assert!(player.change_state(FighterState::Standing).is_none());
    }

    #[test]
    fn test_change_state_from_is_compare_and_set() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        player.change_state(FighterState::Jump);

        // Отпустили block, но уже в прыжке — ничего не меняется
        assert!(player.change_state_from(FighterState::Block, FighterState::Standing).is_none());
        assert_eq!(player.state, FighterState::Jump);
    }

    #[test]
    fn test_block_absorbs_low_level_hit() {
        let mut player = blocking_player();

        assert_eq!(player.hurt(15.0, 1), HurtOutcome::Blocked);
        assert_eq!(player.hurt(15.0, 10), HurtOutcome::Blocked);
        assert_eq!(player.health, 100.0);
    }

    #[test]
    fn test_high_level_hit_breaks_block() {
        let mut player = blocking_player();

        assert_eq!(player.hurt(15.0, 11), HurtOutcome::Damaged { damage: 15.0 });
        assert_eq!(player.health, 85.0);
    }

    #[test]
    fn test_health_clamped_at_zero_and_lying_ignores_hits() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        player.health = 5.0;

        assert_eq!(player.hurt(20.0, 5), HurtOutcome::Defeated { damage: 20.0 });
        assert_eq!(player.health, 0.0);

        player.change_state(FighterState::Lying);
        assert_eq!(player.hurt(20.0, 5), HurtOutcome::Ignored);
        assert_eq!(player.health, 0.0);
    }

    #[test]
    fn test_negative_damage_never_heals() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        player.health = 50.0;

        player.hurt(-30.0, 5);
        assert_eq!(player.health, 50.0);
    }

    #[test]
    fn test_horizontal_velocity_from_intent() {
        let mut player = Player::new(Side::Left, &CombatTuning::default());
        player.move_intent.set(1, true);
        assert_eq!(player.horizontal_velocity(100.0), 100.0);

        // Обе стороны зажаты — стоим
        player.move_intent.set(-1, true);
        assert_eq!(player.horizontal_velocity(100.0), 0.0);

        player.move_intent.set(1, false);
        assert_eq!(player.horizontal_velocity(100.0), -100.0);

        // В блоке не двигаемся
        player.change_state(FighterState::Block);
        assert_eq!(player.horizontal_velocity(100.0), 0.0);
    }

    #[test]
    fn test_special_meter() {
        let mut meter = SpecialMeter::new(50.0, 1.0);
        assert!(!meter.spend());

        meter.add_damage(30.0);
        assert!(!meter.is_full());
        meter.add_damage(30.0);
        assert_eq!(meter.charge, 50.0); // clamped

        assert!(meter.spend());
        assert_eq!(meter.charge, 0.0);
    }

    #[test]
    fn test_reset_for_round() {
        let mut player = blocking_player();
        player.health = 0.0;
        player.extend_cooldown(10.0, 5.0);
        player.move_intent.set(1, true);

        player.reset_for_round();

        assert_eq!(player.state, FighterState::Standing);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.defence_level, 0);
        assert!(player.can_act(0.0));
        assert_eq!(player.move_intent.axis(), 0.0);
    }
}
