use std::collections::HashMap;

use anyhow::Result;
use sqlx::PgPool;

use crate::properties::{Property, TagCount};

/// Count tag frequency across delimited tag fields.
///
/// Splits each field on commas, trims, drops empties. Counting is
/// case-insensitive with the first-seen casing kept for display. Ordered
/// by descending count; ties keep first-encountered order.
pub fn count_tags<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<TagCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tags: Vec<TagCount> = Vec::new();

    for field in fields {
        for tag in field.split(',') {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            match index.get(&tag.to_lowercase()) {
                Some(&i) => tags[i].count += 1,
                None => {
                    index.insert(tag.to_lowercase(), tags.len());
                    tags.push(TagCount {
                        value: tag.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // Stable sort preserves first-encountered order among equal counts
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    tags
}

/// The `n` most frequent vibe tags across every stored record.
pub async fn top_tags(pool: &PgPool, n: usize) -> Result<Vec<TagCount>> {
    let fields = Property::all_vibe_features(pool).await?;
    let mut tags = count_tags(fields.iter().map(String::as_str));
    tags.truncate(n);
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_across_records_descending() {
        let tags = count_tags(["Pool, Gym", "Pool", "Gym, Sea View"]);
        assert_eq!(tags[0].value, "Pool");
        assert_eq!(tags[0].count, 2);
        assert_eq!(tags[1].value, "Gym");
        assert_eq!(tags[1].count, 2);
        assert_eq!(tags[2].value, "Sea View");
        assert_eq!(tags[2].count, 1);
    }

    #[test]
    fn top_two_matches_expected_order() {
        let mut tags = count_tags(["Pool, Gym", "Pool", "Gym, Sea View"]);
        tags.truncate(2);
        let values: Vec<&str> = tags.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["Pool", "Gym"]);
    }

    #[test]
    fn case_insensitive_with_first_seen_casing() {
        let tags = count_tags(["Sea View, pool", "POOL, Pool"]);
        assert_eq!(tags[0].value, "pool");
        assert_eq!(tags[0].count, 3);
        assert_eq!(tags[1].value, "Sea View");
    }

    #[test]
    fn empty_and_whitespace_fields_are_ignored() {
        let tags = count_tags(["", "  ", " , ,", "Gym"]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, "Gym");
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let tags = count_tags(["Balcony, Garden", "Garden, Balcony"]);
        assert_eq!(tags[0].value, "Balcony");
        assert_eq!(tags[1].value, "Garden");
    }
}
