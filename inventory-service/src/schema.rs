diesel::table! {
    inventory (id) {
        id -> Int8,
        name -> Varchar,
        stock -> Int4,
        etc -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}
