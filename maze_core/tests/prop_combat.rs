//! Property-based tests for combat, linking and the win condition.

use proptest::prelude::*;

use maze_core::{
    ElementId, GameConfig, GameEvent, Mode, Orientation, Outcome,
    actor::{Hit, Vitals},
    builder::MazeBuilder,
    orientation::Sides,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Health drops by exactly the attacker's power until it clamps at zero,
    /// and the death is reported once.
    #[test]
    fn prop_hits_subtract_power_and_die_once(
        health in 1i32..50,
        power in 1i32..12,
        hits in 0usize..20,
    ) {
        let mut vitals = Vitals { health, power: 0, position: 1 };
        let mut deaths = 0;
        for n in 1..=hits {
            let before = vitals.health;
            match vitals.suffer(power) {
                Hit::Survived { health: left } => {
                    prop_assert_eq!(left, before - power);
                    prop_assert!(left > 0);
                }
                Hit::Died => deaths += 1,
                Hit::AlreadyDead => prop_assert!(before == 0),
            }
            let expected = (health - power * n as i32).max(0);
            prop_assert_eq!(vitals.health, expected);
        }
        let lethal = power as i64 * hits as i64 >= health as i64;
        prop_assert_eq!(deaths, usize::from(lethal));
    }

    /// Whatever was linked last on a side is what the side holds.
    #[test]
    fn prop_last_link_wins(links in prop::collection::vec((0usize..4, 0usize..100), 0..32)) {
        let mut sides = Sides::default();
        let mut expected = [None; 4];
        for &(side, element) in &links {
            Orientation::ALL[side].set_slot(ElementId(element), &mut sides);
            expected[side] = Some(ElementId(element));
        }
        for (side, orientation) in Orientation::ALL.into_iter().enumerate() {
            prop_assert_eq!(orientation.slot(&sides), expected[side]);
        }
    }

    /// Retiring creatures in any order, repeats included, declares the
    /// character's victory exactly once.
    #[test]
    fn prop_victory_is_declared_once(
        count in 1usize..6,
        order in prop::collection::vec(0usize..6, 0..24),
    ) {
        let mut builder = MazeBuilder::new();
        builder.build_room(1).unwrap();
        for _ in 0..count {
            builder.build_creature(Mode::Lazy, 1).unwrap();
        }
        let game = builder.build_session(GameConfig::default()).unwrap();
        game.add_character("Hero").unwrap();

        for id in order.into_iter().filter(|&id| id < count) {
            game.retire_creature(id).unwrap();
        }
        game.retire_all_creatures();
        game.retire_all_creatures();

        let victories: Vec<GameEvent> = game
            .events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Victory(_)))
            .collect();
        prop_assert_eq!(victories, vec![GameEvent::Victory(Outcome::CharacterWins)]);
    }
}
