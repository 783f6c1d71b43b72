use crate::env::ItemOracle;

use super::Reward;

/// One material line as a UI would render it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialLine {
    pub item_id: String,
    pub name: String,
    pub icon: String,
    pub quantity: u64,
}

/// Resolves the materials of `reward` against the item catalog.
///
/// Materials without a template are skipped here but stay in the reward.
pub fn material_lines(reward: &Reward, items: &(impl ItemOracle + ?Sized)) -> Vec<MaterialLine> {
    reward
        .materials
        .iter()
        .filter(|(_, quantity)| **quantity > 0)
        .filter_map(|(item_id, &quantity)| {
            let template = items.template(item_id)?;
            Some(MaterialLine {
                item_id: item_id.clone(),
                name: template.name,
                icon: template.icon,
                quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::env::{ItemCatalog, ItemTemplate};

    use super::*;

    #[test]
    fn unknown_materials_are_hidden_not_dropped() {
        let items: ItemCatalog = [ItemTemplate::new("bolt", "Bolt", "bolt.png")]
            .into_iter()
            .collect();
        let mut reward = Reward::new();
        reward.add_material("bolt", 2);
        reward.add_material("mystery", 5);

        let lines = material_lines(&reward, &items);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Bolt");
        assert_eq!(reward.material("mystery"), 5);
    }
}
