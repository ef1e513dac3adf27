use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(&pool, "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user_with_role(&pool, "user@example.com", "user123", "user").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM products")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("Products already seeded ({count} rows), skipping");
        return Ok(());
    }

    // (title, description, price in cents, category, image, rating rate, rating count)
    let samples: &[(&str, &str, i64, &str, &str, f64, i32)] = &[
        (
            "Wireless Bluetooth Headphones",
            "High-quality wireless headphones with noise cancellation and 30-hour battery life.",
            8999,
            "electronics",
            "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=500&h=500&fit=crop",
            4.5,
            245,
        ),
        (
            "Smart Fitness Watch",
            "Waterproof smartwatch featuring heart rate monitoring and GPS.",
            19999,
            "electronics",
            "https://images.unsplash.com/photo-1434494878577-86c23bcb06b9?w=500&h=500&fit=crop",
            4.7,
            189,
        ),
        (
            "Organic Cotton T-Shirt",
            "Comfortable and sustainable organic cotton t-shirt available in multiple colors.",
            2999,
            "men's clothing",
            "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=500&h=500&fit=crop",
            4.3,
            156,
        ),
        (
            "Leather Crossbody Bag",
            "Genuine leather crossbody bag with multiple compartments.",
            7999,
            "women's clothing",
            "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=500&h=500&fit=crop",
            4.6,
            98,
        ),
        (
            "Stainless Steel Coffee Mug",
            "Double-walled travel mug that keeps drinks hot for hours. Spill-proof lid included.",
            2499,
            "home",
            "https://images.unsplash.com/photo-1514228742587-6b1558fcf93a?w=500&h=500&fit=crop",
            4.4,
            203,
        ),
        (
            "Yoga Exercise Mat",
            "Non-slip premium yoga mat with excellent cushioning.",
            3999,
            "sports",
            "https://images.unsplash.com/photo-1544367567-0f2fcb009e0b?w=500&h=500&fit=crop",
            4.5,
            127,
        ),
    ];

    for &(title, description, price, category, image, rate, rating_count) in samples {
        sqlx::query(
            r#"
            INSERT INTO products (id, title, description, price, category, image, rating_rate, rating_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(image)
        .bind(rate)
        .bind(rating_count)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", samples.len());
    Ok(())
}
