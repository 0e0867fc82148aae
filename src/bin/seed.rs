use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use smartcart_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    domain::health,
    entity::{inventories, products, users},
    models::{NutritionFacts, ProductCategory},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm, &config.migrations_dir).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin123", "admin").await?;
    let seller_id = ensure_user(&orm, "seller@example.com", "seller123", "seller").await?;
    let user_id = ensure_user(&orm, "user@example.com", "user123", "user").await?;
    seed_products(&orm, seller_id).await?;

    println!("Seed completed. Admin: {admin_id}, Seller: {seller_id}, User: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present (role={})", existing.role);
        return Ok(existing.id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

struct SeedProduct {
    barcode: &'static str,
    name: &'static str,
    category: ProductCategory,
    price: i64,
    original_price: Option<i64>,
    unit: &'static str,
    nutrition: Option<NutritionFacts>,
    stock: i32,
}

async fn seed_products(orm: &DatabaseConnection, seller_id: Uuid) -> anyhow::Result<()> {
    let items = vec![
        SeedProduct {
            barcode: "4001234567890",
            name: "Whole Milk 1L",
            category: ProductCategory::Dairy,
            price: 129,
            original_price: Some(149),
            unit: "l",
            nutrition: Some(NutritionFacts {
                calories: 64.0,
                protein_g: 3.4,
                carbs_g: 4.8,
                fat_g: 3.6,
                fiber_g: 0.0,
                sugar_g: 4.8,
                sodium_mg: 44.0,
            }),
            stock: 120,
        },
        SeedProduct {
            barcode: "4009876543210",
            name: "Sourdough Loaf",
            category: ProductCategory::Bakery,
            price: 349,
            original_price: None,
            unit: "piece",
            nutrition: Some(NutritionFacts {
                calories: 250.0,
                protein_g: 8.0,
                carbs_g: 48.0,
                fat_g: 1.5,
                fiber_g: 2.5,
                sugar_g: 2.0,
                sodium_mg: 480.0,
            }),
            stock: 30,
        },
        SeedProduct {
            barcode: "4005550001112",
            name: "Bananas",
            category: ProductCategory::Produce,
            price: 99,
            original_price: None,
            unit: "kg",
            nutrition: Some(NutritionFacts {
                calories: 89.0,
                protein_g: 1.1,
                carbs_g: 22.8,
                fat_g: 0.3,
                fiber_g: 2.6,
                sugar_g: 12.2,
                sodium_mg: 1.0,
            }),
            stock: 200,
        },
        SeedProduct {
            barcode: "4007770003334",
            name: "Sparkling Water 6-pack",
            category: ProductCategory::Beverages,
            price: 299,
            original_price: Some(399),
            unit: "pack",
            nutrition: None,
            stock: 80,
        },
    ];

    for item in items {
        let exists = products::Entity::find()
            .filter(products::Column::Barcode.eq(item.barcode))
            .one(orm)
            .await?;
        if exists.is_some() {
            continue;
        }

        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller_id),
            barcode: Set(item.barcode.to_string()),
            name: Set(item.name.to_string()),
            description: Set(None),
            category: Set(item.category),
            price: Set(item.price),
            original_price: Set(item.original_price),
            unit: Set(item.unit.to_string()),
            health_score: Set(health::health_score(item.nutrition.as_ref())),
            nutrition: Set(item.nutrition),
            min_stock_level: Set(10),
            max_stock_level: Set(500),
            alternatives: Set(Default::default()),
            is_active: Set(true),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;

        inventories::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            seller_id: Set(seller_id),
            stock_level: Set(item.stock),
            min_stock_level: Set(10),
            max_stock_level: Set(500),
            reorder_level: Set(20),
            reorder_quantity: Set(100),
            location: Set(Some("main-warehouse".to_string())),
            expiry_date: Set(None),
            batches: Set(Default::default()),
            predicted_daily_demand: Set(None),
            predicted_weekly_demand: Set(None),
            predicted_monthly_demand: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
