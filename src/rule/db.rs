use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::CategoryId,
    rule::models::{Rule, RuleId, RuleWithCategory},
};

/// The keywords seeded into an empty rule table, grouped by the name of the
/// category they select. Earlier groups take precedence.
pub const DEFAULT_KEYWORDS: [(&str, &[&str]); 6] = [
    (
        "Food & Groceries",
        &["grocery", "supermarket", "food", "walmart", "target"],
    ),
    (
        "Transportation",
        &["gas", "fuel", "uber", "lyft", "taxi", "parking"],
    ),
    (
        "Entertainment",
        &["netflix", "spotify", "movie", "cinema", "game"],
    ),
    (
        "Bills & Utilities",
        &["electric", "water", "internet", "phone", "utility"],
    ),
    (
        "Healthcare",
        &["pharmacy", "doctor", "medical", "hospital", "clinic"],
    ),
    ("Shopping", &["amazon", "store", "shop", "mall"]),
];

/// Create a rule in the database. The keyword is trimmed and lowercased.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyRuleKeyword] if `keyword` is empty or only whitespace,
/// - [Error::InvalidCategory] if `category_id` does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_rule(
    keyword: &str,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Rule, Error> {
    let keyword = keyword.trim().to_lowercase();

    if keyword.is_empty() {
        return Err(Error::EmptyRuleKeyword);
    }

    connection
        .execute(
            "INSERT INTO category_rule (keyword, category_id) VALUES (?1, ?2);",
            (&keyword, category_id),
        )
        .map_err(|error| match Error::from(error) {
            Error::InvalidCategory(None) => Error::InvalidCategory(Some(category_id)),
            error => error,
        })?;

    let id = connection.last_insert_rowid();

    Ok(Rule {
        id,
        keyword,
        category_id,
    })
}

/// Retrieve all rules in precedence order, i.e. the order they were created.
pub fn get_all_rules(connection: &Connection) -> Result<Vec<Rule>, Error> {
    connection
        .prepare("SELECT id, keyword, category_id FROM category_rule ORDER BY id ASC;")?
        .query_map([], map_rule_row)?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all rules in precedence order with their category names.
pub(super) fn get_all_rules_with_categories(
    connection: &Connection,
) -> Result<Vec<RuleWithCategory>, Error> {
    connection
        .prepare(
            "SELECT r.id, r.keyword, r.category_id, c.name
             FROM category_rule r
             INNER JOIN category c ON r.category_id = c.id
             ORDER BY r.id ASC",
        )?
        .query_map([], |row| {
            Ok(RuleWithCategory {
                rule: map_rule_row(row)?,
                category_name: row.get(3)?,
            })
        })?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Delete a rule from the database.
///
/// # Errors
/// Returns [Error::DeleteMissingRule] if the rule doesn't exist.
pub fn delete_rule(rule_id: RuleId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category_rule WHERE id = ?1", [rule_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRule);
    }

    Ok(())
}

/// Insert [DEFAULT_KEYWORDS] if the rule table is empty.
///
/// Groups whose category does not exist are skipped.
pub fn seed_default_rules(connection: &Connection) -> Result<(), Error> {
    let rule_count: i64 =
        connection.query_row("SELECT COUNT(*) FROM category_rule", [], |row| row.get(0))?;

    if rule_count > 0 {
        return Ok(());
    }

    let mut find_category =
        connection.prepare("SELECT id FROM category WHERE name = ?1 COLLATE NOCASE")?;

    for (category_name, keywords) in DEFAULT_KEYWORDS {
        let Some(category_id) = find_category
            .query_row([category_name], |row| row.get::<_, CategoryId>(0))
            .optional()?
        else {
            tracing::debug!("skipping default rules for missing category {category_name}");
            continue;
        };

        for keyword in keywords {
            create_rule(keyword, category_id, connection)?;
        }
    }

    Ok(())
}

pub fn create_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category_rule (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                UNIQUE(keyword, category_id)
            );",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_category_rule_category_id ON category_rule(category_id)",
        (),
    )?;

    Ok(())
}

fn map_rule_row(row: &Row) -> Result<Rule, rusqlite::Error> {
    let id = row.get(0)?;
    let keyword = row.get(1)?;
    let category_id = row.get(2)?;

    Ok(Rule {
        id,
        keyword,
        category_id,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        category::{CategoryName, create_category, get_all_categories},
        test_utils::get_test_connection,
        transaction::TransactionType,
    };

    use super::{
        DEFAULT_KEYWORDS, create_rule, delete_rule, get_all_rules, get_all_rules_with_categories,
        seed_default_rules,
    };

    #[test]
    fn default_rules_are_seeded_in_order() {
        let connection = get_test_connection();

        let rules = get_all_rules(&connection).unwrap();

        let keyword_count: usize = DEFAULT_KEYWORDS
            .iter()
            .map(|(_, keywords)| keywords.len())
            .sum();
        assert_eq!(rules.len(), keyword_count);
        assert_eq!(rules[0].keyword, "grocery");
        assert_eq!(rules.last().unwrap().keyword, "mall");
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let connection = get_test_connection();
        let before = get_all_rules(&connection).unwrap().len();

        seed_default_rules(&connection).unwrap();

        assert_eq!(get_all_rules(&connection).unwrap().len(), before);
    }

    #[test]
    fn create_rule_lowercases_keyword() {
        let connection = get_test_connection();
        let pets = create_category(
            CategoryName::new_unchecked("Pets"),
            TransactionType::Expense,
            "",
            &connection,
        )
        .unwrap();

        let rule = create_rule("  PetSmart ", pets.id, &connection).unwrap();

        assert_eq!(rule.keyword, "petsmart");
        assert_eq!(get_all_rules(&connection).unwrap().last(), Some(&rule));
    }

    #[test]
    fn create_rule_rejects_empty_keyword_and_unknown_category() {
        let connection = get_test_connection();
        let category_id = get_all_categories(&connection).unwrap()[0].id;

        assert_eq!(
            create_rule("   ", category_id, &connection),
            Err(Error::EmptyRuleKeyword)
        );
        assert_eq!(
            create_rule("vet", 9999, &connection),
            Err(Error::InvalidCategory(Some(9999)))
        );
    }

    #[test]
    fn rules_with_categories_include_names() {
        let connection = get_test_connection();

        let rules = get_all_rules_with_categories(&connection).unwrap();

        assert_eq!(rules[0].category_name, "Food & Groceries");
    }

    #[test]
    fn delete_rule_succeeds() {
        let connection = get_test_connection();
        let rule = get_all_rules(&connection).unwrap()[0].clone();

        delete_rule(rule.id, &connection).unwrap();

        assert!(!get_all_rules(&connection).unwrap().contains(&rule));
        assert_eq!(
            delete_rule(rule.id, &connection),
            Err(Error::DeleteMissingRule)
        );
    }
}
