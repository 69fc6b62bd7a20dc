use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            category TEXT NOT NULL,
            product_url TEXT NOT NULL,
            image_url TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
        "
    )
}
