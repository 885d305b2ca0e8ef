//! End-to-end tests for the storage manager.
//!
//! Drives seeding, online placement, removal and reorganization through
//! `AsrsManager` and checks the stacking invariants after every step.

use approx::assert_relative_eq;
use u_asrs_stacking::{
    AsrsManager, BinConfig, BinTemplate, Entrance, Error, Item, ManagerConfig, RemovalFailure,
    RotationConstraint,
};

const TOLERANCE: f64 = 1e-9;

/// Every pallet fits its bin's footprint, stacks are gap-free and the bin
/// height equals the top of the highest band.
fn assert_consistent(manager: &AsrsManager) {
    for bin in manager.bins().values() {
        let mut stack: Vec<_> = bin.pallets().collect();
        stack.sort_by(|a, b| a.position().y.total_cmp(&b.position().y));

        let mut top = 0.0;
        for pallet in stack {
            assert_eq!(pallet.bin(), bin.id());
            assert!(pallet.placed_dimensions().x <= bin.width() + TOLERANCE);
            assert!(pallet.placed_dimensions().z <= bin.depth() + TOLERANCE);
            assert_relative_eq!(pallet.position().y, top, epsilon = TOLERANCE);
            top += bin.adjusted(pallet.placed_dimensions().y);
        }

        assert_relative_eq!(bin.current_height(), top, epsilon = TOLERANCE);
        assert!(top <= bin.height() + TOLERANCE);
    }
}

fn warehouse() -> AsrsManager {
    let config = ManagerConfig::new(
        BinConfig::new(100.0, 200.0, 100.0, 5.0),
        vec![4, 3, 5, 2, 6],
        vec![2, 6, 3, 5, 4],
    )
    .with_pallet_bins(vec![1, 7])
    .with_pallet_count(30);
    AsrsManager::from_config(config).unwrap()
}

fn arrival(i: usize) -> Item {
    let width = 20.0 + ((i * 13) % 70) as f64;
    let height = 10.0 + ((i * 37) % 50) as f64;
    let depth = 15.0 + ((i * 7) % 60) as f64;
    let rotation = if i % 3 == 0 {
        RotationConstraint::Free
    } else {
        RotationConstraint::Fixed
    };
    Item::new(format!("item-{}", i), width, height, depth).with_rotation(rotation)
}

#[test]
fn test_full_lifecycle() {
    let mut manager = warehouse();
    assert_eq!(manager.empty_pallet_count(), 30);
    assert_eq!(manager.bin(1).unwrap().len(), 30);
    assert_consistent(&manager);

    // 11 loads of at most 60 each cannot exhaust five 200-high bins.
    for i in 0..11 {
        let plan = manager.place_item_online(arrival(i)).unwrap();
        assert!(manager.online_priority().contains(&plan.target().bin));
        assert_consistent(&manager);
    }
    assert_eq!(manager.empty_pallet_count(), 19);

    let removed: Vec<_> = (0..11)
        .step_by(3)
        .map(|i| manager.find_cargo(&format!("item-{}", i)).unwrap().id())
        .collect();
    for id in &removed {
        let removal = manager.remove_item(*id).unwrap();
        assert!(removal.pallet.is_empty());
        assert!(manager.pallet_bins().contains(&removal.pallet.bin()));
        assert_consistent(&manager);
    }
    assert_eq!(manager.empty_pallet_count(), 19 + removed.len());

    let report = manager.reorganize_offline().unwrap();
    assert_eq!(report.pallet_count(), 30);
    assert_consistent(&manager);
    for i in (0..11).filter(|i| i % 3 != 0) {
        let stored = manager.find_cargo(&format!("item-{}", i)).unwrap();
        assert!(manager.offline_priority().contains(&stored.bin()));
    }
    assert_eq!(manager.empty_pallet_count(), 19 + removed.len());
}

#[test]
fn test_removal_then_replacement_reuses_freed_space() {
    let mut manager = AsrsManager::from_parts(
        BinTemplate::new(100.0, 100.0, 100.0, 5.0),
        vec![3, 2, 4],
        vec![4, 2, 3],
        vec![1],
        4,
        None,
    )
    .unwrap();

    manager.place_item_online(Item::new("a", 40.0, 30.0, 40.0)).unwrap();
    manager.place_item_online(Item::new("b", 40.0, 30.0, 40.0)).unwrap();
    let a = manager.find_cargo("a").unwrap().id();

    let removal = manager.remove_item(a).unwrap();
    assert_eq!(removal.cargo.id(), "a");
    assert_relative_eq!(manager.bin(3).unwrap().current_height(), 30.0);

    let plan = manager.place_item_online(Item::new("c", 40.0, 30.0, 40.0)).unwrap();
    assert_eq!(plan.target().bin, 3);
    assert_relative_eq!(plan.target().height(), 30.0);
    assert_consistent(&manager);
}

#[test]
fn test_removal_waits_for_pallet_bin_room() {
    let mut manager = AsrsManager::from_parts(
        BinTemplate::new(100.0, 100.0, 100.0, 5.0),
        vec![3, 1],
        vec![3, 1],
        vec![1],
        10,
        None,
    )
    .unwrap();

    let x = manager.place_item_online(Item::new("x", 40.0, 100.0, 40.0)).unwrap();
    assert_eq!(x.target().bin, 3);

    // Bin 3 is full, so the exchange stays inside the pallet bin and fills it.
    let y = manager.place_item_online(Item::new("y", 40.0, 60.0, 40.0)).unwrap();
    assert!(y.is_same_bin());
    assert_relative_eq!(manager.bin(1).unwrap().current_height(), 100.0);

    let before = manager.locations();
    let err = manager.remove_item(x.pallet_id()).unwrap_err();
    assert_eq!(
        err,
        Error::Removal {
            id: x.pallet_id(),
            reason: RemovalFailure::NoPalletBin
        }
    );
    assert!(err.is_retryable());
    assert_eq!(manager.locations(), before);
    assert!(manager.find_cargo("x").is_some());

    // Freeing the pallet bin makes the same request succeed.
    manager.remove_item(y.pallet_id()).unwrap();
    manager.remove_item(x.pallet_id()).unwrap();
    assert_eq!(manager.empty_pallet_count(), 10);
    assert_consistent(&manager);
}

#[test]
fn test_exchange_inside_full_pallet_bin() {
    let mut manager = AsrsManager::from_parts(
        BinTemplate::new(100.0, 100.0, 100.0, 5.0),
        vec![1, 2],
        vec![2, 1],
        vec![1],
        20,
        None,
    )
    .unwrap();
    assert_relative_eq!(manager.bin(1).unwrap().remaining_height(), 0.0);

    let plan = manager
        .place_item_online(Item::new("thin", 40.0, 5.0, 40.0))
        .unwrap();
    assert!(plan.is_same_bin());
    assert_relative_eq!(plan.target().height(), 95.0);
    assert_eq!(manager.find_cargo("thin").unwrap().id(), plan.pallet_id());
    assert_consistent(&manager);
}

#[test]
fn test_overfull_reorganization_names_every_leftover() {
    let mut manager = AsrsManager::from_parts(
        BinTemplate::new(100.0, 100.0, 100.0, 5.0),
        vec![2, 3],
        vec![2],
        vec![1],
        6,
        None,
    )
    .unwrap();
    for name in ["a", "b", "c", "d"] {
        manager.place_item_online(Item::new(name, 40.0, 40.0, 40.0)).unwrap();
    }
    let c = manager.find_cargo("c").unwrap().id();
    let d = manager.find_cargo("d").unwrap().id();
    let before = manager.snapshot();

    let err = manager.reorganize_offline().unwrap_err();
    assert_eq!(err, Error::Reorganization { unplaced: vec![c, d] });

    for (id, bin) in manager.bins() {
        let original = &before[id];
        assert_eq!(bin.len(), original.len());
        for pallet in bin.pallets() {
            assert_eq!(original.get(pallet.id()), Some(pallet));
        }
    }
}

#[test]
fn test_identical_inputs_give_identical_layouts() {
    let run = || {
        let mut manager = warehouse();
        for i in 0..11 {
            manager.place_item_online(arrival(i)).unwrap();
        }
        manager.reorganize_offline().unwrap();
        manager.locations()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_custom_entrance_picks_nearest_pallet() {
    let config = ManagerConfig::new(
        BinConfig::new(100.0, 100.0, 100.0, 5.0),
        vec![3],
        vec![3],
    )
    .with_pallet_bins(vec![1, 5])
    .with_pallet_count(25)
    .with_entrance(Entrance::new(5, 0.0));
    let mut manager = AsrsManager::from_config(config).unwrap();

    // Pallets 1..=20 fill bin 1; 21..=25 spill into bin 5.
    let plan = manager.place_item_online(Item::new("a", 40.0, 30.0, 40.0)).unwrap();
    assert_eq!(plan.pallet_id(), 21);
    assert_eq!(plan.source().bin, 5);
}
