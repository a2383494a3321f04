mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use carvo::domain::entities::{NewRental, RentalFilter, RentalStatus};
use carvo::domain::repositories::RentalRepository;
use carvo::infrastructure::persistence::PgRentalRepository;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[sqlx::test]
async fn test_create_embeds_car_and_username(pool: PgPool) {
    let user = common::create_user(&pool, "carol", false).await;
    let car = common::create_car(&pool, "Peugeot", "208", 3100).await;
    common::add_car_image(&pool, car, "cars/208.jpg").await;
    let repo = PgRentalRepository::new(Arc::new(pool));

    let rental = repo
        .create(NewRental {
            user_id: user,
            car_id: car,
            start_date: day("2025-05-01"),
            end_date: day("2025-05-02"),
            total_price: Decimal::new(6200, 2),
        })
        .await
        .unwrap();

    assert_eq!(rental.status, RentalStatus::Pending);
    assert_eq!(rental.username, "carol");
    assert_eq!(rental.car.id, car);
    assert_eq!(rental.car.images.len(), 1);
    assert_eq!(rental.total_price, Decimal::new(6200, 2));
}

#[sqlx::test]
async fn test_has_overlap_boundaries(pool: PgPool) {
    let user = common::create_user(&pool, "carol", false).await;
    let car = common::create_car(&pool, "Peugeot", "308", 3900).await;
    common::create_rental(&pool, user, car, "2025-03-10", "2025-03-15", "pending").await;
    let repo = PgRentalRepository::new(Arc::new(pool));

    let cases = [
        ("2025-03-01", "2025-03-09", false),
        ("2025-03-01", "2025-03-10", true),
        ("2025-03-12", "2025-03-13", true),
        ("2025-03-15", "2025-03-20", true),
        ("2025-03-16", "2025-03-20", false),
        ("2025-03-01", "2025-03-31", true),
    ];

    for (start, end, expected) in cases {
        let overlap = repo.has_overlap(car, day(start), day(end)).await.unwrap();
        assert_eq!(overlap, expected, "{start}..={end}");
    }
}

#[sqlx::test]
async fn test_has_overlap_ignores_finished_rentals_and_other_cars(pool: PgPool) {
    let user = common::create_user(&pool, "carol", false).await;
    let car = common::create_car(&pool, "Peugeot", "508", 5200).await;
    let other = common::create_car(&pool, "Peugeot", "2008", 4100).await;
    common::create_rental(&pool, user, car, "2025-03-10", "2025-03-15", "cancelled").await;
    common::create_rental(&pool, user, car, "2025-03-10", "2025-03-15", "completed").await;
    common::create_rental(&pool, user, other, "2025-03-10", "2025-03-15", "active").await;
    let repo = PgRentalRepository::new(Arc::new(pool));

    assert!(!repo.has_overlap(car, day("2025-03-11"), day("2025-03-12")).await.unwrap());
}

#[sqlx::test]
async fn test_transition_status_checks_current_status(pool: PgPool) {
    let user = common::create_user(&pool, "carol", false).await;
    let car = common::create_car(&pool, "Citroen", "C3", 2900).await;
    let id = common::create_rental(&pool, user, car, "2025-04-01", "2025-04-02", "pending").await;
    let repo = PgRentalRepository::new(Arc::new(pool.clone()));

    let moved = repo
        .transition_status(id, RentalStatus::Pending, RentalStatus::Active)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.status, RentalStatus::Active);
    assert!(moved.updated_at >= moved.created_at);

    let stale = repo
        .transition_status(id, RentalStatus::Pending, RentalStatus::Cancelled)
        .await
        .unwrap();
    assert!(stale.is_none());
    assert_eq!(common::rental_status(&pool, id).await, "active");
}

#[sqlx::test]
async fn test_list_filters_by_user_status_and_search(pool: PgPool) {
    let carol = common::create_user(&pool, "carol", false).await;
    let dan = common::create_user(&pool, "dan", false).await;
    let car = common::create_car(&pool, "Citroen", "C4", 3300).await;
    common::create_rental(&pool, carol, car, "2025-01-01", "2025-01-02", "pending").await;
    let newest = common::create_rental(&pool, carol, car, "2025-02-01", "2025-02-02", "active").await;
    common::create_rental(&pool, dan, car, "2025-03-01", "2025-03-02", "active").await;
    let repo = PgRentalRepository::new(Arc::new(pool));

    let mine = RentalFilter::new(0, 10).for_user(carol);
    let rentals = repo.list(mine.clone()).await.unwrap();
    assert_eq!(rentals.len(), 2);
    assert_eq!(rentals[0].id, newest);
    assert_eq!(repo.count(mine).await.unwrap(), 2);

    let active = RentalFilter {
        status: Some(RentalStatus::Active),
        ..RentalFilter::new(0, 10)
    };
    assert_eq!(repo.count(active).await.unwrap(), 2);

    let by_name = RentalFilter {
        search: Some("DA".to_string()),
        ..RentalFilter::new(0, 10)
    };
    assert_eq!(repo.count(by_name).await.unwrap(), 1);

    let wildcard = RentalFilter {
        search: Some("_".to_string()),
        ..RentalFilter::new(0, 10)
    };
    assert_eq!(repo.count(wildcard).await.unwrap(), 0);
}

#[sqlx::test]
async fn test_find_details_includes_email_and_payment(pool: PgPool) {
    let user = common::create_user(&pool, "carol", false).await;
    let car = common::create_car(&pool, "Renault", "Zoe", 3000).await;
    let id = common::create_rental(&pool, user, car, "2025-04-01", "2025-04-02", "active").await;
    common::create_payment(&pool, id, false).await;
    let repo = PgRentalRepository::new(Arc::new(pool));

    let details = repo.find_details(id).await.unwrap().unwrap();

    assert_eq!(details.email, "carol@example.com");
    assert_eq!(details.rental.id, id);
    assert!(details.payment.is_some_and(|p| !p.is_paid));

    assert!(repo.find_details(999_999).await.unwrap().is_none());
}
