//! Query composition: filter descent, flattening, name filter, sort.

use super::filter::FilterSequence;
use super::name_filter::NameFilter;
use super::sort::SortSequence;
use crate::error::Result;
use crate::item::Item;
use crate::layout::{LayoutIndex, LayoutSequence};
use crate::property::PropertyCatalog;

/// A compiled query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filter: FilterSequence,
    sort: SortSequence,
    names: NameFilter,
}

impl Query {
    /// Parses the three query strings. Only a malformed filter element fails.
    pub fn compile(filter: &str, sort: &str, name_filter: &str) -> Result<Self> {
        Ok(Self {
            filter: FilterSequence::parse(filter)?,
            sort: SortSequence::parse(sort),
            names: NameFilter::parse(name_filter),
        })
    }

    pub fn filter(&self) -> &FilterSequence {
        &self.filter
    }

    pub fn sort(&self) -> &SortSequence {
        &self.sort
    }

    pub fn names(&self) -> &NameFilter {
        &self.names
    }

    /// Runs against `index`, which must have been built from `items`.
    pub fn run<'a>(
        &self,
        items: &'a [Item],
        index: &LayoutIndex,
        catalog: &PropertyCatalog,
    ) -> Vec<&'a Item> {
        let candidates = if self.filter.is_empty() {
            items.iter().collect::<Vec<_>>()
        } else {
            self.filter
                .select(index)
                .into_iter()
                .filter_map(|position| items.get(position))
                .collect::<Vec<_>>()
        };

        let mut selected = candidates
            .into_iter()
            .filter(|item| self.names.matches(&item.name))
            .collect::<Vec<_>>();
        self.sort.sort(&mut selected, catalog);

        tracing::debug!(
            total = items.len(),
            selected = selected.len(),
            filter_levels = self.filter.len(),
            index_depth = index.depth(),
            "query completed"
        );
        selected
    }
}

/// One-shot query that builds a throwaway index for `layout`.
pub fn query<'a>(
    items: &'a [Item],
    catalog: &PropertyCatalog,
    layout: &LayoutSequence,
    filter: &str,
    sort: &str,
    name_filter: &str,
) -> Result<Vec<&'a Item>> {
    let query = Query::compile(filter, sort, name_filter)?;
    let index = LayoutIndex::build(items, layout);
    Ok(query.run(items, &index, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyType, PropertyValue};

    fn scalar(value: &str) -> PropertyValue {
        PropertyValue::Scalar(value.to_string())
    }

    fn fixture() -> (PropertyCatalog, Vec<Item>) {
        let mut catalog = PropertyCatalog::new();
        catalog.define("genre", PropertyType::String).expect("genre");
        catalog.define("year", PropertyType::Integer).expect("year");
        catalog.define("tags", PropertyType::List).expect("tags");
        let items = vec![
            Item::new(1, "Dune", "")
                .with("genre", scalar("fiction"))
                .with("year", scalar("1990"))
                .with("tags", PropertyValue::List(vec!["desert".into(), "epic".into()])),
            Item::new(2, "Neuromancer", "")
                .with("genre", scalar("fiction"))
                .with("year", scalar("2001"))
                .with("tags", PropertyValue::List(vec!["cyber".into()])),
            Item::new(3, "SPQR", "")
                .with("genre", scalar("history"))
                .with("year", scalar("2015")),
            Item::new(4, "Untitled", ""),
        ];
        (catalog, items)
    }

    fn ids(items: &[&Item]) -> Vec<u64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn filter_then_range_selects_matching_years() {
        let (catalog, items) = fixture();
        let layout = LayoutSequence::parse("genre/year", &catalog).expect("layout");

        let hits = query(&items, &catalog, &layout, "fiction/1990-2001", "year", "")
            .expect("query");
        assert_eq!(ids(&hits), vec![1, 2]);

        let hits = query(&items, &catalog, &layout, "fiction/2002-2010", "", "")
            .expect("query");
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_filter_reproduces_every_item() {
        let (catalog, items) = fixture();
        let layout = LayoutSequence::parse("genre/year", &catalog).expect("layout");
        let hits = query(&items, &catalog, &layout, "", "", "").expect("query");
        assert_eq!(ids(&hits), vec![1, 2, 3, 4]);
    }

    #[test]
    fn list_keys_match_any_element() {
        let (catalog, items) = fixture();
        let layout = LayoutSequence::parse("tags", &catalog).expect("layout");
        let hits = query(&items, &catalog, &layout, "EPIC", "", "").expect("query");
        assert_eq!(ids(&hits), vec![1]);
    }

    #[test]
    fn name_filter_and_sort_compose() {
        let (catalog, items) = fixture();
        let layout = LayoutSequence::parse("genre", &catalog).expect("layout");
        let hits = query(&items, &catalog, &layout, "*", "year", "an/dune/spqr")
            .expect("query");
        assert_eq!(ids(&hits), vec![1, 2, 3]);

        let hits = query(&items, &catalog, &layout, "", "genre/year", "*").expect("query");
        assert_eq!(ids(&hits), vec![4, 1, 2, 3]);
    }

    #[test]
    fn malformed_filter_is_rejected() {
        assert!(Query::compile("1990-", "", "").is_err());
    }

    #[test]
    fn compiled_query_is_deterministic() {
        let (catalog, items) = fixture();
        let layout = LayoutSequence::parse("genre/year", &catalog).expect("layout");
        let index = LayoutIndex::build(&items, &layout);
        let compiled = Query::compile("*/*", "", "").expect("compile");
        let first = ids(&compiled.run(&items, &index, &catalog));
        let second = ids(&compiled.run(&items, &index, &catalog));
        assert_eq!(first, second);
        assert_eq!(first.len(), items.len());
    }

    #[test]
    fn sorting_mixed_numeric_text_is_total() {
        let (catalog, _) = fixture();
        let items = (0..200u64)
            .map(|id| {
                let year = match id % 4 {
                    0 => format!("{id}a"),
                    1 => "x".to_string(),
                    _ => (200 - id).to_string(),
                };
                Item::new(id, format!("item {id}"), "").with("year", scalar(&year))
            })
            .collect::<Vec<_>>();
        let hits = query(&items, &catalog, &LayoutSequence::empty(), "", "year", "")
            .expect("query");
        assert_eq!(hits.len(), items.len());

        let parsed = hits
            .iter()
            .take_while(|item| item.value("year").to_string().parse::<i64>().is_ok())
            .count();
        assert_eq!(parsed, 100);
        assert_eq!(hits[0].value("year"), &scalar("1"));
        assert_eq!(hits[199].value("year"), &scalar("x"));
    }
}
