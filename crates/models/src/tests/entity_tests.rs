use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{appointment, db::connect_with_config, order, order_line, user};

async fn migrated() -> DatabaseConnection {
    let path = std::env::temp_dir().join(format!("models-entity-{}.db", Uuid::new_v4()));
    let cfg = configs::DatabaseConfig { url: format!("sqlite://{}?mode=rwc", path.display()), ..Default::default() };
    let db = connect_with_config(&cfg).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

#[test]
fn username_rules() {
    assert!(user::validate_username("pepe").is_ok());
    assert!(user::validate_username("a.b-c_d").is_ok());
    assert!(user::validate_username("ab").is_err());
    assert!(user::validate_username("has space").is_err());
    assert!(user::validate_username(&"x".repeat(33)).is_err());
}

#[test]
fn email_rules() {
    assert!(user::validate_email("pepe@perez.com").is_ok());
    assert!(user::validate_email("pepe").is_err());
    assert!(user::validate_email("@perez.com").is_err());
}

#[test]
fn line_rules() {
    assert!(order_line::validate_line(1, 0.0).is_ok());
    assert!(order_line::validate_line(0, 1.0).is_err());
    assert!(order_line::validate_line(1, -0.5).is_err());
    assert!(order_line::validate_line(1, f64::NAN).is_err());
}

#[tokio::test]
async fn user_insert_and_unique_username() {
    let db = migrated().await;
    let now = Utc::now().fixed_offset();
    let make = |id: Uuid| user::ActiveModel {
        id: Set(id),
        username: Set("pepe".into()),
        email: Set("pepe@perez.com".into()),
        password_hash: Set("hash".into()),
        image: Set(None),
        address: Set(Some("Pepe Services".into())),
        role: Set("ADMIN".into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    make(Uuid::new_v4()).insert(&db).await.unwrap();
    assert!(make(Uuid::new_v4()).insert(&db).await.is_err());
    let found = user::Entity::find().filter(user::Column::Username.eq("pepe")).one(&db).await.unwrap();
    assert_eq!(found.unwrap().address.as_deref(), Some("Pepe Services"));
}

#[tokio::test]
async fn order_lines_follow_relation() {
    let db = migrated().await;
    let now = Utc::now().fixed_offset();
    let order_id = Uuid::new_v4();
    order::ActiveModel { id: Set(order_id), user_id: Set(Uuid::new_v4()), created_at: Set(now), updated_at: Set(now) }
        .insert(&db)
        .await
        .unwrap();
    for (position, qty) in [1, 2].into_iter().enumerate() {
        order_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(Uuid::new_v4()),
            quantity: Set(qty),
            unit_price: Set(9.5),
            position: Set(position as i32),
        }
        .insert(&db)
        .await
        .unwrap();
    }
    let o = order::Entity::find_by_id(order_id).one(&db).await.unwrap().unwrap();
    let lines = o.find_related(order_line::Entity).all(&db).await.unwrap();
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn appointment_gets_generated_id() {
    let db = migrated().await;
    let saved = appointment::ActiveModel {
        uuid: Set(Uuid::new_v4()),
        user_id: Set(Uuid::new_v4()),
        assistance: Set("REPAIR".into()),
        date: Set(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 30, 0).unwrap()),
        description: Set("boiler".into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();
    assert!(saved.id > 0);
}
