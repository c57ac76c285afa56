//! Diesel schema for association persistence.

diesel::table! {
    /// Primary id to resource id associations, one row per namespace and key.
    associations (namespace, primary_id) {
        /// Store namespace; empty for the root namespace.
        #[max_length = 255]
        namespace -> Varchar,
        /// Caller-chosen primary identifier.
        #[max_length = 255]
        primary_id -> Varchar,
        /// Remote resource identifier, always positive.
        resource_id -> Int8,
        /// Time the association was last written.
        recorded_at -> Timestamptz,
    }
}
