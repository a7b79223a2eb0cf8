// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: sample models and queries

use trilogy_studio_catalog::SourceFragment;

/// Sample model text for testing
pub struct ModelFixtures;

impl ModelFixtures {
    // ===== Models =====

    /// Orders and customers, joinable on `customer_id`
    pub const fn shop_model() -> &'static str {
        r#"type money float;

key order_id int; # unique order identifier
key customer_id int; # customer placing the order
property order_id.order_date date;
property order_id.amount float::money; # order value in dollars
property order_id.status string;
property customer_id.customer_name string;
property customer_id.region string;
key _load_id int;

metric order_count <- count(order_id);
metric revenue <- sum(amount); # total order value

datasource orders_table (
    id: order_id,
    customer_id: customer_id,
    order_date: order_date,
    amount: amount,
    status: status,
    load_id: _load_id
)
grain (order_id)
address shop.orders;

datasource customers_table (
    id: customer_id,
    name: customer_name,
    region: region
)
grain (customer_id)
address shop.customers;
"#
    }

    /// Two plain columns `x` and `y` on one table
    pub const fn facts_model() -> &'static str {
        r#"key x int;
property x.y float;

datasource facts (
    x: x,
    y: y
)
grain (x)
address db.facts;
"#
    }

    /// Imports `shop` under an alias
    pub const fn nested_model() -> &'static str {
        r#"import shop as store;

key warehouse_id int;
property warehouse_id.city string;

datasource warehouses (
    id: warehouse_id,
    city: city
)
grain (warehouse_id)
address shop.warehouses;
"#
    }

    // ===== Queries =====

    /// Aggregate with a filter and ordering
    pub const fn revenue_by_region() -> &'static str {
        "WHERE status = 'complete'\nSELECT region, sum(amount) as region_revenue\nORDER BY region_revenue desc\nLIMIT 5;"
    }

    /// Query text that stops mid-statement
    pub const fn incomplete_query() -> &'static str {
        "const threshold <- 100;\nselect order_id, amount;\nselect order_id where amount >"
    }

    // ===== Source sets =====

    /// `shop` module only
    pub fn shop_sources() -> Vec<SourceFragment> {
        vec![SourceFragment::new("shop", Self::shop_model())]
    }

    /// `facts` module only
    pub fn facts_sources() -> Vec<SourceFragment> {
        vec![SourceFragment::new("facts", Self::facts_model())]
    }

    /// `shop` plus `warehouse`, which imports `shop as store`
    pub fn all_sources() -> Vec<SourceFragment> {
        vec![
            SourceFragment::new("shop", Self::shop_model()),
            SourceFragment::new("facts", Self::facts_model()),
            SourceFragment::new("warehouse", Self::nested_model()),
        ]
    }
}
