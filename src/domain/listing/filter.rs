use std::collections::HashSet;

use crate::entities::filter_category::FilterCategory;

use super::ListingItem;

/// The part of a visitor's selection that belongs to one filter category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection<'a> {
    pub category_id: &'a str,
    pub option_ids: HashSet<&'a str>,
}

/// Groups selected option ids by the category that owns them.
///
/// Categories without a selected option are left out, and so are selected
/// ids that no category owns.
pub fn group_by_category<'a>(
    selected: &HashSet<String>,
    categories: &'a [FilterCategory],
) -> Vec<CategorySelection<'a>> {
    categories
        .iter()
        .filter_map(|category| {
            let option_ids: HashSet<&str> = category
                .options
                .iter()
                .map(|option| option.id.as_str())
                .filter(|id| selected.contains(*id))
                .collect();

            (!option_ids.is_empty()).then_some(CategorySelection {
                category_id: category.id.as_str(),
                option_ids,
            })
        })
        .collect()
}

/// AND across categories, OR within a category.
pub fn matches_selection<T: ListingItem>(item: &T, groups: &[CategorySelection<'_>]) -> bool {
    groups.iter().all(|group| {
        item.filter_ids()
            .iter()
            .any(|id| group.option_ids.contains(id.as_str()))
    })
}

/// Keeps the items that match the selection, in their original order.
/// An empty selection keeps everything.
pub fn filter_items<T: ListingItem>(
    items: Vec<T>,
    selected: &HashSet<String>,
    categories: &[FilterCategory],
) -> Vec<T> {
    if selected.is_empty() {
        return items;
    }

    let groups = group_by_category(selected, categories);
    items
        .into_iter()
        .filter(|item| matches_selection(item, &groups))
        .collect()
}

/// Parses a comma separated `filters` query value.
pub fn parse_selection(raw: Option<&str>) -> HashSet<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::filter_category::{FilterCategory, FilterOption};
    use crate::listing::test_support::{ids, Item};

    fn category(id: &str, options: &[&str]) -> FilterCategory {
        FilterCategory {
            id: id.to_string(),
            name: id.to_string(),
            name_cs: id.to_string(),
            sort_order: 0,
            options: options
                .iter()
                .map(|o| FilterOption {
                    id: o.to_string(),
                    label: o.to_string(),
                    label_cs: o.to_string(),
                })
                .collect(),
        }
    }

    fn categories() -> Vec<FilterCategory> {
        vec![
            category("materials", &["PLA", "PETG", "ABS"]),
            category("tech", &["FDM", "SLA"]),
        ]
    }

    fn selection(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_selection_is_identity() {
        let items = vec![Item::new("a"), Item::new("b").filters(&["PLA"])];
        let result = filter_items(items.clone(), &HashSet::new(), &categories());
        assert_eq!(result, items);
    }

    #[test]
    fn selection_in_other_category_option_excludes() {
        let items = vec![Item::new("p").filters(&["PLA", "FDM"])];
        let result = filter_items(items, &selection(&["PETG"]), &categories());
        assert!(result.is_empty());
    }

    #[test]
    fn or_within_category() {
        let items = vec![Item::new("p").filters(&["PLA", "FDM"])];
        let result = filter_items(items, &selection(&["PLA", "PETG"]), &categories());
        assert_eq!(ids(&result), vec!["p"]);
    }

    #[test]
    fn and_across_categories() {
        let items = vec![Item::new("p").filters(&["PLA", "FDM"])];

        let included = filter_items(items.clone(), &selection(&["PLA", "FDM"]), &categories());
        assert_eq!(ids(&included), vec!["p"]);

        // PLA matches materials, but the tech category asks for SLA only.
        let excluded = filter_items(items, &selection(&["PLA", "SLA"]), &categories());
        assert!(excluded.is_empty());
    }

    #[test]
    fn unowned_selection_ids_are_dropped() {
        let items = vec![Item::new("a").filters(&["PLA"]), Item::new("b")];
        let result = filter_items(items, &selection(&["does-not-exist"]), &categories());
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn every_result_intersects_each_represented_category() {
        let items = vec![
            Item::new("a").filters(&["PLA", "FDM"]),
            Item::new("b").filters(&["ABS", "SLA"]),
            Item::new("c").filters(&["PETG"]),
            Item::new("d").filters(&["SLA"]),
            Item::new("e").filters(&["PLA", "SLA"]),
        ];
        let selected = selection(&["PLA", "ABS", "SLA"]);
        let cats = categories();
        let groups = group_by_category(&selected, &cats);
        let result = filter_items(items, &selected, &cats);

        assert_eq!(ids(&result), vec!["b", "e"]);
        for item in &result {
            for group in &groups {
                assert!(item.filters.iter().any(|f| group.option_ids.contains(f.as_str())));
            }
        }
    }

    #[test]
    fn parses_comma_separated_query() {
        let parsed = parse_selection(Some("PLA, FDM,,"));
        assert_eq!(parsed, selection(&["PLA", "FDM"]));
        assert!(parse_selection(None).is_empty());
    }
}
