//! Property tests: random input and time sequences never break the cascade.
//!
//! After every step:
//! - open levels are exactly `1..=depth`;
//! - at most one hover-intent timer is pending;
//! - at most one auto-close timer is pending per level;
//! - every open panel has exactly one item with `tab_index == 0`;
//! - focus is always inside an open panel;
//! - a closed session has no submenus, hover intent, focus, or listeners;
//! - pointer input on an item outside the panel open at its level is
//!   ignored as an unknown target.

use cascade_core::event::{Interaction, KeyCode};
use cascade_core::geometry::Rect;
use cascade_harness::Harness;
use cascade_menu::cascade::CascadeTimer;
use cascade_menu::event::{MenuInput, PointerTarget};
use cascade_menu::item_tree::{MenuEntry, MenuNode, NodeId};
use cascade_menu::keyboard::CascadeOps;
use cascade_menu::request::{IgnoreReason, Request};
use cascade_menu::session::{SessionPhase, TimerKind};
use proptest::prelude::*;

fn items() -> Vec<MenuEntry> {
    vec![
        MenuEntry::item("Alpha"),
        MenuEntry::item("Bravo").submenu(vec![
            MenuEntry::item("Charlie"),
            MenuEntry::item("Delta").submenu(vec![
                MenuEntry::item("Echo"),
                MenuEntry::item("Foxtrot").submenu(vec![MenuEntry::item("Golf")]),
            ]),
            MenuEntry::divider(),
            MenuEntry::item("Hotel").disabled(true),
        ]),
        MenuEntry::divider(),
        MenuEntry::item("India").submenu(vec![MenuEntry::item("Juliet"), MenuEntry::item("Kilo")]),
        MenuEntry::item("Lima")
            .disabled(true)
            .submenu(vec![MenuEntry::item("Mike")]),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Open(bool),
    Close(bool, bool),
    Hover { level: usize, index: usize },
    HoverPanel(usize),
    HoverOutside,
    Click { level: usize, index: usize },
    ClickAnchor,
    ClickOutside,
    Key(KeyCode),
    CloseFrom(usize),
    Advance(u64),
    StrayHover { level: usize, pick: usize },
    StrayClick { level: usize, pick: usize },
    MoveAnchor(i32, i32),
    DropAnchor,
    Resize,
}

fn key_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Down),
        Just(KeyCode::Up),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
        Just(KeyCode::Enter),
        Just(KeyCode::Escape),
        Just(KeyCode::Tab),
        Just(KeyCode::Char('d')),
        Just(KeyCode::Char('e')),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => any::<bool>().prop_map(Op::Open),
        1 => (any::<bool>(), any::<bool>()).prop_map(|(r, s)| Op::Close(r, s)),
        4 => (0usize..4, 0usize..6).prop_map(|(level, index)| Op::Hover { level, index }),
        1 => (0usize..4).prop_map(Op::HoverPanel),
        1 => Just(Op::HoverOutside),
        3 => (0usize..4, 0usize..6).prop_map(|(level, index)| Op::Click { level, index }),
        1 => Just(Op::ClickAnchor),
        1 => Just(Op::ClickOutside),
        4 => key_strategy().prop_map(Op::Key),
        1 => (1usize..4).prop_map(Op::CloseFrom),
        5 => prop_oneof![Just(0u64), 1u64..60, 60u64..400].prop_map(Op::Advance),
        2 => (0usize..4, 0usize..16).prop_map(|(level, pick)| Op::StrayHover { level, pick }),
        2 => (0usize..4, 0usize..16).prop_map(|(level, pick)| Op::StrayClick { level, pick }),
        1 => ((0i32..900), (0i32..780)).prop_map(|(x, y)| Op::MoveAnchor(x, y)),
        1 => Just(Op::DropAnchor),
        1 => Just(Op::Resize),
    ]
}

/// Item id at `index` in the panel at `level`, clamped to what is open.
fn item_at(h: &Harness, level: usize, index: usize) -> Option<(usize, NodeId)> {
    let level = level.min(h.depth());
    let stack = h.session.cascade();
    let items = h.session.tree().children(stack.anchor_at(level));
    let node = items.get(index % items.len().max(1))?;
    Some((level, node.id.clone()))
}

/// Any item id in the tree, paired with an unclamped level.
fn stray_target(h: &Harness, level: usize, pick: usize) -> (usize, NodeId) {
    fn collect(nodes: &[MenuNode], out: &mut Vec<NodeId>) {
        for node in nodes {
            out.push(node.id.clone());
            collect(node.children(), out);
        }
    }
    let mut ids = Vec::new();
    collect(h.session.tree().roots(), &mut ids);
    (level, ids[pick % ids.len()].clone())
}

fn in_open_panel(h: &Harness, level: usize, id: &NodeId) -> bool {
    let stack = h.session.cascade();
    level <= stack.depth()
        && h
            .session
            .tree()
            .children(stack.anchor_at(level))
            .iter()
            .any(|n| n.id == *id)
}

fn apply(h: &mut Harness, op: &Op) -> Result<(), TestCaseError> {
    match op {
        Op::Open(keyboard) => {
            let interaction = if *keyboard {
                Interaction::Keyboard
            } else {
                Interaction::Pointer
            };
            h.session.open(interaction);
        }
        Op::Close(restore, skip) => {
            h.session.close(*restore, *skip);
        }
        Op::Hover { level, index } => {
            if let Some((level, id)) = item_at(h, *level, *index) {
                h.hover(PointerTarget::Item { level, id });
            }
        }
        Op::HoverPanel(level) => {
            let level = (*level).min(h.depth());
            h.hover(PointerTarget::Panel { level });
        }
        Op::HoverOutside => {
            h.hover(PointerTarget::Outside);
        }
        Op::Click { level, index } => {
            if let Some((level, id)) = item_at(h, *level, *index) {
                h.click(PointerTarget::Item { level, id });
            }
        }
        Op::ClickAnchor => {
            h.click(PointerTarget::Anchor);
        }
        Op::ClickOutside => {
            h.click(PointerTarget::Outside);
        }
        Op::Key(code) => {
            h.press(*code);
        }
        Op::CloseFrom(level) => {
            h.session.close_submenus(*level);
        }
        Op::Advance(ms) => {
            h.advance(*ms);
        }
        Op::StrayHover { level, pick } | Op::StrayClick { level, pick } => {
            let (level, id) = stray_target(h, *level, *pick);
            let stale = h.session.is_open() && !in_open_panel(h, level, &id);
            let target = PointerTarget::Item { level, id };
            let request = if matches!(op, Op::StrayHover { .. }) {
                h.hover(target)
            } else {
                h.click(target)
            };
            if stale {
                prop_assert_eq!(request, Request::Ignored(IgnoreReason::UnknownTarget));
            }
        }
        Op::MoveAnchor(x, y) => {
            h.surface_mut().anchor = Some(Rect::new(*x, *y, 80, 24));
        }
        Op::DropAnchor => {
            h.surface_mut().anchor = None;
        }
        Op::Resize => {
            h.session.handle_input(MenuInput::Resize);
        }
    }
    Ok(())
}

fn check_invariants(h: &Harness) -> Result<(), TestCaseError> {
    let stack = h.session.cascade();
    prop_assert!(stack.is_contiguous(), "levels not contiguous: {:?}", stack);

    let hover_timers = h
        .session
        .pending_timers()
        .filter(|k| matches!(k, TimerKind::Cascade(CascadeTimer::HoverIntent { .. })))
        .count();
    prop_assert!(hover_timers <= 1, "{hover_timers} hover-intent timers pending");

    for level in 1..=stack.depth().max(1) {
        let auto_close = h
            .session
            .pending_timers()
            .filter(|k| {
                matches!(k, TimerKind::Cascade(CascadeTimer::AutoClose { level: l }) if *l == level)
            })
            .count();
        prop_assert!(auto_close <= 1, "{auto_close} auto-close timers at level {level}");
    }

    if !h.session.is_open() {
        prop_assert_eq!(stack.depth(), 0);
        prop_assert!(h.session.hover_intent().is_none());
        prop_assert!(h.session.focused_item().is_none());
        prop_assert!(h.session.listeners().is_empty());
        return Ok(());
    }

    for level in 0..=stack.depth() {
        let Some(panel) = stack.panel_at(level) else {
            continue;
        };
        let Some(record) = h.surface().panel(panel) else {
            return Err(TestCaseError::fail(format!("panel at level {level} not mounted")));
        };
        let tabbable = record.a11y.values().filter(|a| a.tab_index == 0).count();
        prop_assert_eq!(tabbable, 1, "panel at level {} has {} tabbable items", level, tabbable);
    }

    if let Some(focused) = h.session.focused_item() {
        let visible = (0..=stack.depth())
            .any(|level| {
                h.session
                    .tree()
                    .children(stack.anchor_at(level))
                    .iter()
                    .any(|n| n.id == *focused)
            });
        prop_assert!(visible, "focus on {focused} outside every open panel");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn cascade_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut h = Harness::new(&items()).expect("harness");
        for op in &ops {
            apply(&mut h, op)?;
            check_invariants(&h)?;
        }

        // Eventually every deferred step drains.
        h.run_until_idle();
        check_invariants(&h)?;
        prop_assert_eq!(h.session.next_deadline(), None);
    }

    #[test]
    fn close_from_level_one_always_empties(depth in 1usize..=3, hovers in 0usize..3) {
        let mut h = Harness::new(&items()).expect("harness");
        h.open_settled(Interaction::Keyboard);
        // Bravo > Delta > Foxtrot: always the second item of each panel.
        for _ in 0..depth {
            h.press(KeyCode::Down);
            h.press(KeyCode::Right);
            h.settle_submenu();
        }
        prop_assert_eq!(h.depth(), depth);
        for _ in 0..hovers {
            h.hover(PointerTarget::Panel { level: h.depth() });
        }
        h.session.close_submenus(1);
        prop_assert_eq!(h.depth(), 0);
        prop_assert!(h.session.is_open());
    }

    #[test]
    fn session_ends_closed_after_close_and_idle(
        ops in prop::collection::vec(op_strategy(), 0..30),
        skip in any::<bool>(),
    ) {
        let mut h = Harness::new(&items()).expect("harness");
        for op in &ops {
            apply(&mut h, op)?;
        }
        h.surface_mut().anchor = Some(Rect::new(40, 60, 80, 24));
        h.run_until_idle();
        if h.session.phase() == SessionPhase::Closed {
            h.open_settled(Interaction::Pointer);
        }
        if h.session.phase() == SessionPhase::Open {
            h.session.close(false, skip);
        }
        h.run_until_idle();
        prop_assert_eq!(h.session.phase(), SessionPhase::Closed);
        prop_assert!(h.surface().mounted().is_empty());
    }
}
