// src/aliases/scope_terms.rs

/// Terms that describe a restaurant and never belong on a dish attribute.
pub const RESTAURANT_SCOPED_TERMS: [&str; 16] = [
    "patio",
    "romantic",
    "fine dining",
    "family friendly",
    "family-friendly",
    "outdoor seating",
    "date night",
    "rooftop",
    "waterfront",
    "live music",
    "happy hour",
    "dog friendly",
    "kid friendly",
    "reservations",
    "ambiance",
    "atmosphere",
];

/// Terms that describe a dish and never belong on a restaurant attribute.
pub const DISH_SCOPED_TERMS: [&str; 14] = [
    "spicy",
    "crispy",
    "gluten-free",
    "gluten free",
    "dairy-free",
    "crunchy",
    "creamy",
    "savory",
    "tangy",
    "smoky",
    "juicy",
    "tender",
    "al dente",
    "medium rare",
];
