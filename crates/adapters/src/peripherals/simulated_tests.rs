// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use logi_core::test_support::torch_recipe;

const INV: &str = "turtle_1";

fn loaded(coal: u64, stick: u64) -> (MemoryStock, SimulatedPeripherals) {
    let stock = MemoryStock::default();
    stock.put(INV, &ItemId::from("minecraft:coal"), coal);
    stock.put(INV, &ItemId::from("minecraft:stick"), stick);
    let sim = SimulatedPeripherals::new(INV, stock.clone());
    (stock, sim)
}

#[tokio::test]
async fn craft_consumes_ingredients_and_produces_output() {
    let (stock, sim) = loaded(2, 2);

    assert_eq!(sim.craft(&torch_recipe(), 2).await, Ok(2));

    let inv = stock.inventory(INV);
    assert_eq!(inv.get(&ItemId::from("minecraft:torch")), 8);
    assert_eq!(inv.get(&ItemId::from("minecraft:coal")), 0);
    assert_eq!(sim.crafted(), 2);
}

#[tokio::test]
async fn craft_with_nothing_is_an_error() {
    let (_, sim) = loaded(0, 1);
    let result = sim.craft(&torch_recipe(), 1).await;
    assert!(matches!(result, Err(PeripheralError::MissingIngredients { .. })));
}

#[tokio::test]
async fn craft_stops_at_first_shortage() {
    let (_, sim) = loaded(3, 1);
    assert_eq!(sim.craft(&torch_recipe(), 3).await, Ok(1));
}

#[tokio::test]
async fn fail_after_limits_multiples() {
    let (_, sim) = loaded(10, 10);
    sim.fail_after(2);
    assert_eq!(sim.craft(&torch_recipe(), 5).await, Ok(2));
    assert!(matches!(
        sim.craft(&torch_recipe(), 1).await,
        Err(PeripheralError::CraftFailed(_))
    ));
}

#[tokio::test]
async fn perform_known_task_fills_inventory() {
    let stock = MemoryStock::default();
    let sim = SimulatedPeripherals::new(INV, stock.clone())
        .with_task("mine_iron", "minecraft:raw_iron");

    assert_eq!(sim.perform("mine_iron", 12).await, Ok(12));
    assert_eq!(stock.inventory(INV).get(&ItemId::from("minecraft:raw_iron")), 12);
}

#[tokio::test]
async fn perform_unknown_task_fails() {
    let sim = SimulatedPeripherals::new(INV, MemoryStock::default());
    assert_eq!(
        sim.perform("dig_to_bedrock", 1).await,
        Err(PeripheralError::UnknownTask("dig_to_bedrock".to_string()))
    );
}
