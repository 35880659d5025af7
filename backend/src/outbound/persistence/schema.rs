//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts. Emails are unique ignoring case (`lower(email)` index).
    users (id) {
        id -> Int8,
        email -> Varchar,
        name -> Varchar,
        /// PHC string, or an unusable marker starting with `!`.
        password_hash -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
    }
}

diesel::table! {
    /// One API token digest per user.
    auth_tokens (user_id) {
        user_id -> Int8,
        /// Hex SHA-256 of the plaintext token.
        digest -> Varchar,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int8,
        user_id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        time_minutes -> Int4,
        price -> Numeric,
        link -> Varchar,
        /// Media-root-relative image path.
        image -> Nullable<Varchar>,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int8,
        ingredient_id -> Int8,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(tags -> users (user_id));
diesel::joinable!(ingredients -> users (user_id));
diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
);
