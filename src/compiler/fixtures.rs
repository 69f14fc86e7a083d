//! Records shared by the compiler, reorder and DDL unit tests.

use crate::{record, Ref};

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CustomerOrder {
        #[sql = "pkey:id"]
        pub id: i64,
        #[sql = "title;unique"]
        pub title: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct OrderItem {
        #[sql = "pkey:id"]
        pub id: i64,
        #[sql = "fkey:order_id;unique_per_order;index"]
        pub order: Option<Ref<CustomerOrder>>,
        #[sql = "fkey:gift_for_id;null"]
        pub gift_for: Option<Ref<CustomerOrder>>,
        #[sql = "name;unique_per_order"]
        pub name: String,
        #[sql = "price;default=0;check(price >= 0)"]
        pub price: f64,
        #[sql = "note;null"]
        pub note: Option<String>,
        #[sql = "position;position"]
        pub position: i64,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Tag {
        #[sql = "pkey:id"]
        pub id: i64,
        #[sql = "label"]
        pub label: String,
    }
}

pub fn item(id: i64, order: i64, name: &str, position: i64) -> OrderItem {
    OrderItem {
        id,
        order: (order != 0).then(|| Ref::new(order)),
        name: name.to_string(),
        position,
        ..OrderItem::default()
    }
}
