//! Root entities: catalogs (data vendors) and games.

use crate::config::ValidationRule;

entity! {
    /// A vendor or source of card-game data. Names are globally unique.
    Catalog {
        resource: "catalog",
        table: "catalogs",
        create: CatalogCreate,
        update: CatalogUpdate,
    }
    fields {
        name: String,
    }
    schema(s) {
        s.unique("name").rule("name", ValidationRule::name())
    }
}

entity! {
    /// A trading-card game.
    Game {
        resource: "game",
        table: "games",
        create: GameCreate,
        update: GameUpdate,
    }
    fields {
        name: String,
    }
    schema(s) {
        s.rule("name", ValidationRule::name())
    }
}
