//! Plain-text rendering of a resolution

use std::fmt;

use crate::calculator::Resolution;
use crate::catalog::Catalog;
use crate::models::Node;

/// Format a manufacturing tree as an indented list.
///
/// `max_depth` limits how many levels below the root are printed; a node
/// whose children are cut off is marked with `[+]`.
pub fn format_tree(node: &Node, max_depth: Option<usize>) -> String {
    let mut output = String::new();
    write_node(&mut output, node, 0, max_depth);
    output
}

fn write_node(output: &mut String, node: &Node, depth: usize, max_depth: Option<usize>) {
    let prefix = "  ".repeat(depth);
    output.push_str(&format!("{}{} x {}", prefix, node.quantity, node.name));
    if let Some(note) = &node.note {
        output.push_str(&format!(" {}", note));
    }

    let folded = max_depth.is_some_and(|max| depth >= max);
    if folded && !node.children.is_empty() {
        output.push_str(" [+]");
    }
    output.push('\n');

    if !folded {
        for child in &node.children {
            write_node(output, child, depth + 1, max_depth);
        }
    }
}

/// Totals section of a resolution, with ids resolved to names
pub struct TotalsReport<'a> {
    catalog: &'a Catalog,
    resolution: &'a Resolution,
}

impl<'a> TotalsReport<'a> {
    pub fn new(catalog: &'a Catalog, resolution: &'a Resolution) -> Self {
        Self { catalog, resolution }
    }
}

impl fmt::Display for TotalsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = &self.resolution.root;
        let totals = &self.resolution.totals;

        writeln!(f, "=== Totals ===")?;
        writeln!(f, "Target: {} x {}", root.quantity, root.name)?;
        writeln!(f)?;

        writeln!(f, "Blueprints:")?;
        for id in totals.blueprints() {
            writeln!(f, "  {}", self.catalog.display_name(*id))?;
        }
        writeln!(f)?;

        writeln!(f, "Raw materials:")?;
        for (id, quantity) in totals.components() {
            writeln!(f, "  {} x {}", quantity, self.catalog.display_name(*id))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Expander;
    use crate::models::{Ingredient, ItemId, Recipe};

    fn catalog() -> Catalog {
        Catalog::from_parts(
            [
                (
                    ItemId(587),
                    Recipe::Manufactured {
                        output_quantity: 1,
                        blueprint: Some(ItemId(691)),
                        ingredients: vec![
                            Ingredient { quantity: 1.0, item: ItemId(9000) },
                            Ingredient { quantity: 5.0, item: ItemId(34) },
                        ],
                    },
                ),
                (
                    ItemId(9000),
                    Recipe::Manufactured {
                        output_quantity: 4,
                        blueprint: Some(ItemId(9001)),
                        ingredients: vec![Ingredient { quantity: 10.0, item: ItemId(35) }],
                    },
                ),
            ],
            [
                (ItemId(587), "Rifter"),
                (ItemId(691), "Rifter Blueprint"),
                (ItemId(9000), "Hull Plate"),
                (ItemId(9001), "Hull Plate Blueprint"),
                (ItemId(34), "Tritanium"),
                (ItemId(35), "Pyerite"),
            ]
            .map(|(id, name)| (id, name.to_string())),
        )
    }

    #[test]
    fn renders_full_tree() {
        let catalog = catalog();
        let resolution = Expander::new(&catalog).resolve(ItemId(587), 2).unwrap().unwrap();

        let expected = "\
2 x Rifter
  1 x Rifter Blueprint
  2 x Hull Plate (Makes 4. Storage now 2.)
    1 x Hull Plate Blueprint
    10 x Pyerite
  10 x Tritanium
";
        assert_eq!(format_tree(&resolution.root, None), expected);
    }

    #[test]
    fn depth_limit_folds_subtrees() {
        let catalog = catalog();
        let resolution = Expander::new(&catalog).resolve(ItemId(587), 2).unwrap().unwrap();

        let expected = "\
2 x Rifter
  1 x Rifter Blueprint
  2 x Hull Plate (Makes 4. Storage now 2.) [+]
  10 x Tritanium
";
        assert_eq!(format_tree(&resolution.root, Some(1)), expected);
        assert_eq!(format_tree(&resolution.root, Some(0)), "2 x Rifter [+]\n");
    }

    #[test]
    fn totals_report_lists_names() {
        let catalog = catalog();
        let resolution = Expander::new(&catalog).resolve(ItemId(587), 2).unwrap().unwrap();

        let report = TotalsReport::new(&catalog, &resolution).to_string();
        let expected = "\
=== Totals ===
Target: 2 x Rifter

Blueprints:
  Rifter Blueprint
  Hull Plate Blueprint

Raw materials:
  10 x Tritanium
  10 x Pyerite
";
        assert_eq!(report, expected);
    }
}
