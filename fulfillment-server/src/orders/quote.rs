//! Order pricing
//!
//! A quote is computed once per completion. The persisted rows are built
//! from the same lines, so the total shown to the user and the stored
//! totals cannot diverge.

use rust_decimal::Decimal;
use shared::models::OrderLine;

use crate::db::{Database, food_items};
use crate::session::InProgressOrder;
use crate::utils::money;

#[derive(Debug, Clone, PartialEq)]
pub struct QuotedLine {
    pub item_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quote {
    pub lines: Vec<QuotedLine>,
    /// Names with no menu entry
    pub unpriced: Vec<String>,
}

impl Quote {
    /// Look up every item of the order on one connection
    pub async fn price(db: &Database, order: &InProgressOrder) -> Result<Self, sqlx::Error> {
        let names: Vec<&str> = order.iter().map(|item| item.name.as_str()).collect();
        let found = food_items::find_by_names(db, &names).await?;

        let mut quote = Quote::default();
        for (item, menu_item) in order.iter().zip(found) {
            match menu_item {
                Some(menu_item) => quote.lines.push(QuotedLine {
                    item_id: menu_item.item_id,
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: menu_item.price,
                    line_total: money::line_total(menu_item.price, item.quantity),
                }),
                None => quote.unpriced.push(item.name.clone()),
            }
        }
        Ok(quote)
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.line_total).sum()
    }

    /// Rows to persist under `order_id`
    pub fn order_lines(&self, order_id: i64) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| OrderLine {
                order_id,
                item_id: line.item_id,
                quantity: i64::from(line.quantity),
                total_price: money::to_f64(line.line_total),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    #[tokio::test]
    async fn prices_known_items_and_lists_unknown() {
        let (_dir, db) = test_db().await;
        let order: InProgressOrder = [("pizza", 2), ("sushi", 1), ("Samosa", 3)]
            .into_iter()
            .collect();

        let quote = Quote::price(&db, &order).await.unwrap();
        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.unpriced, vec!["sushi"]);
        assert_eq!(quote.total(), Decimal::from(31));

        let rows = quote.order_lines(4);
        assert_eq!(rows[0].item_id, 3);
        assert_eq!(rows[0].total_price, 16.0);
        assert_eq!(rows[1].quantity, 3);
        assert!(rows.iter().all(|r| r.order_id == 4));
    }

    #[test]
    fn empty_quote_totals_zero() {
        assert_eq!(Quote::default().total(), Decimal::ZERO);
    }
}
