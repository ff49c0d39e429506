//! Cart store integration tests: the merge invariant and the
//! set/remove/clear semantics, run against the in-memory backend.

mod harness;

use harness::*;
use storefront::prelude::*;

#[tokio::test]
async fn merged_line_quantity_is_sum_of_adds() {
    let stack = stack();
    let identity = CartIdentity::User(1);

    // Any sequence of adds for the same (identity, product) folds into one
    // line whose quantity is the sum.
    for quantity in [1, 4, 2, 3] {
        stack.carts.add(&identity, MASK, quantity).await.unwrap();
    }

    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 10);
}

#[tokio::test]
async fn adds_for_different_products_stay_separate() {
    let stack = stack();
    let identity = CartIdentity::Session("s-1".to_string());

    stack.carts.add(&identity, MASK, 1).await.unwrap();
    stack.carts.add(&identity, SARONG, 2).await.unwrap();
    stack.carts.add(&identity, MASK, 1).await.unwrap();

    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart.len(), 2);
}

#[tokio::test]
async fn concurrent_adds_preserve_merge_invariant() {
    let stack = stack();
    let identity = CartIdentity::User(7);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let carts = stack.carts.clone();
        let identity = identity.clone();
        handles.push(tokio::spawn(async move {
            carts.add(&identity, MASK, 1).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart.len(), 1, "exactly one line survives concurrent adds");
    assert_eq!(cart[0].quantity, 16);
}

#[tokio::test]
async fn set_quantity_zero_equals_remove() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    stack.carts.add(&identity, MASK, 2).await.unwrap();
    let line = stack.carts.add(&identity, SARONG, 1).await.unwrap();

    stack.carts.set_quantity(&identity, line.id, 0).await.unwrap();

    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart.len(), 1, "line count decreases by exactly one");
    assert_eq!(cart[0].product_id, MASK);
}

#[tokio::test]
async fn set_negative_quantity_also_removes() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    let line = stack.carts.add(&identity, MASK, 2).await.unwrap();

    stack.carts.set_quantity(&identity, line.id, -5).await.unwrap();

    assert!(stack.carts.cart(&identity).await.unwrap().is_empty());
}

#[tokio::test]
async fn set_quantity_overwrites_rather_than_increments() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    let line = stack.carts.add(&identity, MASK, 2).await.unwrap();

    stack.carts.set_quantity(&identity, line.id, 7).await.unwrap();

    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart[0].quantity, 7);
}

#[tokio::test]
async fn remove_absent_line_is_a_noop() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    stack.carts.add(&identity, MASK, 1).await.unwrap();

    stack
        .carts
        .remove_line(&identity, Uuid::new_v4())
        .await
        .expect("removing an unknown line is not an error");

    assert_eq!(stack.carts.cart(&identity).await.unwrap().len(), 1);
}

#[tokio::test]
async fn clear_does_not_touch_other_identities() {
    let stack = stack();
    let user = CartIdentity::User(1);
    let same_digits_session = CartIdentity::Session("1".to_string());
    stack.carts.add(&user, MASK, 1).await.unwrap();
    stack.carts.add(&same_digits_session, MASK, 1).await.unwrap();

    stack.carts.clear(&user).await.unwrap();

    assert!(stack.carts.cart(&user).await.unwrap().is_empty());
    assert_eq!(
        stack.carts.cart(&same_digits_session).await.unwrap().len(),
        1,
        "a session with the same digits is a different identity"
    );
}

#[tokio::test]
async fn get_cart_is_idempotent() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    stack.carts.add(&identity, MASK, 2).await.unwrap();
    stack.carts.add(&identity, JEWELRY, 1).await.unwrap();

    let first = stack.carts.cart(&identity).await.unwrap();
    let second = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cart_view_joins_catalog_fields() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    stack.carts.add(&identity, MASK, 2).await.unwrap();

    let cart = stack.carts.cart(&identity).await.unwrap();
    let item = &cart[0];
    assert_eq!(item.name, "Raksha Devil Mask");
    assert_eq!(item.price, rust_decimal_macros::dec!(4500));
    assert_eq!(item.original_price, Some(rust_decimal_macros::dec!(5200)));
    assert_eq!(item.category_name.as_deref(), Some("Masks"));
}

#[tokio::test]
async fn delisted_product_hidden_but_line_kept() {
    let stack = stack();
    let identity = CartIdentity::User(1);
    stack.carts.add(&identity, MASK, 1).await.unwrap();
    stack.carts.add(&identity, SARONG, 1).await.unwrap();

    stack.catalog.remove(SARONG);
    assert_eq!(stack.carts.cart(&identity).await.unwrap().len(), 1);

    // Relisting brings the stored line back into view.
    stack.catalog.insert(
        SARONG,
        ProductInfo {
            name: "Handwoven Batik Sarong".to_string(),
            price: rust_decimal_macros::dec!(3300),
            original_price: None,
            image_url: None,
            category_name: None,
        },
    );
    let cart = stack.carts.cart(&identity).await.unwrap();
    assert_eq!(cart.len(), 2);
}
