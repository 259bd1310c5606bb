use std::env;
use chrono_tz::Tz;

pub const DEFAULT_CAPACITY: u32 = 20;
pub const DEFAULT_UPCOMING_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub webhook_secret: String,
    pub payment_link_base_url: String,
    pub default_capacity: u32,
    pub upcoming_limit: u32,
    pub calendar_timezone: Tz,
    pub calendar: Option<CalendarConfig>,
}

/// Remote calendar that holds the event records in its entries' descriptions.
#[derive(Clone)]
pub struct CalendarConfig {
    pub api_base: String,
    pub calendar_id: String,
    pub access_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        let calendar = env::var("CALENDAR_ID").ok().map(|calendar_id| CalendarConfig {
            api_base: env::var("CALENDAR_API_BASE").unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
            calendar_id,
            access_token: env::var("CALENDAR_ACCESS_TOKEN").expect("CALENDAR_ACCESS_TOKEN must be set when CALENDAR_ID is set"),
        });

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set (HS256 member token secret)"),
            webhook_secret: env::var("WEBHOOK_SECRET").expect("WEBHOOK_SECRET must be set"),
            payment_link_base_url: env::var("PAYMENT_LINK_BASE_URL").unwrap_or_else(|_| "https://pay.sports-booking.local/checkout".to_string()),
            default_capacity: env::var("DEFAULT_CAPACITY").ok()
                .map(|v| v.parse().expect("DEFAULT_CAPACITY must be a number"))
                .unwrap_or(DEFAULT_CAPACITY),
            upcoming_limit: env::var("UPCOMING_EVENTS_LIMIT").ok()
                .map(|v| v.parse().expect("UPCOMING_EVENTS_LIMIT must be a number"))
                .unwrap_or(DEFAULT_UPCOMING_LIMIT),
            calendar_timezone: env::var("CALENDAR_TIMEZONE").unwrap_or_else(|_| "Europe/Stockholm".to_string())
                .parse().expect("CALENDAR_TIMEZONE must be an IANA time zone"),
            calendar,
        }
    }
}
