use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use crate::clock::Clock;
use crate::error::ApiError;
use crate::model::reset_token::ResetToken;
use crate::store::tokens::TokenStore;

/// Reset-token policy, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    /// Minutes a token stays redeemable.
    pub expiration_limit: i64,
    /// Minutes that must pass before a new token may be issued for the same
    /// email.
    pub resend_interval: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            expiration_limit: 120,
            resend_interval: 1,
        }
    }
}

/// Verdict of a resend-throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    pub reject: bool,
    pub time_left_seconds: i64,
}

/// Password-reset token lifecycle: issue, look up, expire, throttle, delete.
pub struct ResetTokens {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    policy: TokenPolicy,
}

impl ResetTokens {
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, policy: TokenPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// 32 bytes of entropy, hex-encoded.
    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Elapsed (seconds, whole floored minutes) since the token was created.
    /// The floor-before-compare arithmetic is what the expiry and throttle
    /// boundaries are defined against.
    fn elapsed(&self, token: &ResetToken) -> (i64, i64) {
        let seconds = (self.clock.now() - token.created_at).num_seconds();
        (seconds, seconds.div_euclid(60))
    }

    /// Persists a fresh token for `email` and returns its value. Supersedes
    /// nothing: older rows stay until redeemed, lookups take the latest.
    pub async fn issue(&self, email: &str) -> Result<String, ApiError> {
        let token = Self::generate_token();
        self.store.insert(email, &token, self.clock.now()).await?;

        debug!(email, "reset token issued");

        Ok(token)
    }

    /// Most recent token for `email`, optionally narrowed to an exact value.
    pub async fn find(
        &self,
        email: &str,
        token: Option<&str>,
    ) -> Result<Option<ResetToken>, ApiError> {
        Ok(self.store.find_latest(email, token).await?)
    }

    /// Fails closed: a missing token counts as expired. Expiry is strict,
    /// so a token aged exactly `expiration_limit` whole minutes is still
    /// valid.
    pub fn is_expired(&self, token: Option<&ResetToken>) -> bool {
        let Some(token) = token else { return true };

        let (_, minutes) = self.elapsed(token);
        minutes > self.policy.expiration_limit
    }

    /// A missing token never rejects. `time_left_seconds` counts down the
    /// remainder of the interval while rejecting, and is zero otherwise.
    pub fn resend_throttle(&self, token: Option<&ResetToken>) -> Throttle {
        let Some(token) = token else {
            return Throttle {
                reject: false,
                time_left_seconds: 0,
            };
        };

        let (seconds, minutes) = self.elapsed(token);
        let reject = minutes < self.policy.resend_interval;

        Throttle {
            reject,
            time_left_seconds: if reject {
                self.policy.resend_interval * 60 - seconds
            } else {
                0
            },
        }
    }

    /// Removes the exact `(email, token)` row. `false` when it was already
    /// gone.
    pub async fn delete(&self, token: &ResetToken) -> Result<bool, ApiError> {
        Ok(self.store.delete(&token.email, &token.token).await?)
    }

    /// Reset-confirmation lookup: absent rejects as invalid, stale as
    /// expired, otherwise hands back the record for the caller to redeem and
    /// delete.
    pub async fn validate(&self, email: &str, token: &str) -> Result<ResetToken, ApiError> {
        let Some(found) = self.store.find_latest(email, Some(token)).await? else {
            return Err(ApiError::Invalid("Invalid token".into()));
        };

        if self.is_expired(Some(&found)) {
            return Err(ApiError::Expired(
                "Token has expired, request a new one".into(),
            ));
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::test::FixedClock;

    #[derive(Default)]
    struct MemTokenStore {
        rows: Mutex<Vec<ResetToken>>,
    }

    #[async_trait]
    impl TokenStore for MemTokenStore {
        async fn insert(
            &self,
            email: &str,
            token: &str,
            created_at: DateTime<Utc>,
        ) -> Result<(), sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as u64 + 1;
            rows.push(ResetToken {
                id,
                email: email.into(),
                token: token.into(),
                created_at,
            });
            Ok(())
        }

        async fn find_latest(
            &self,
            email: &str,
            token: Option<&str>,
        ) -> Result<Option<ResetToken>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.email == email && token.map_or(true, |t| r.token == t))
                .max_by_key(|r| (r.created_at, r.id))
                .cloned())
        }

        async fn delete(&self, email: &str, token: &str) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.email == email && r.token == token));
            Ok(rows.len() != before)
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn setup() -> (ResetTokens, Arc<FixedClock>, Arc<MemTokenStore>) {
        let store = Arc::new(MemTokenStore::default());
        let clock = Arc::new(FixedClock::at(t0()));
        let service = ResetTokens::new(store.clone(), clock.clone(), TokenPolicy::default());
        (service, clock, store)
    }

    #[actix_web::test]
    async fn issue_persists_a_64_char_hex_token() {
        let (service, _, store) = setup();

        let token = service.issue("a@x.com").await.unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@x.com");
        assert_eq!(rows[0].token, token);
        assert_eq!(rows[0].created_at, t0());
    }

    #[actix_web::test]
    async fn issued_tokens_are_distinct() {
        let (service, _, _) = setup();

        let a = service.issue("a@x.com").await.unwrap();
        let b = service.issue("a@x.com").await.unwrap();

        assert_ne!(a, b);
    }

    #[actix_web::test]
    async fn expiry_boundary_is_strict_on_whole_minutes() {
        let (service, clock, _) = setup();
        service.issue("a@x.com").await.unwrap();
        let token = service.find("a@x.com", None).await.unwrap();

        clock.advance(Duration::minutes(119));
        assert!(!service.is_expired(token.as_ref()));

        // 119m59s still floors to 119
        clock.advance(Duration::seconds(59));
        assert!(!service.is_expired(token.as_ref()));

        // exactly 120 whole minutes: strict `>` keeps it valid
        clock.advance(Duration::seconds(1));
        assert!(!service.is_expired(token.as_ref()));

        // 120m59s still floors to 120
        clock.advance(Duration::seconds(59));
        assert!(!service.is_expired(token.as_ref()));

        clock.advance(Duration::seconds(1));
        assert!(service.is_expired(token.as_ref()));
    }

    #[actix_web::test]
    async fn missing_token_counts_as_expired() {
        let (service, _, _) = setup();

        assert!(service.is_expired(None));
    }

    #[actix_web::test]
    async fn throttle_rejects_inside_the_first_minute() {
        let (service, clock, _) = setup();
        service.issue("a@x.com").await.unwrap();
        let token = service.find("a@x.com", None).await.unwrap();

        clock.advance(Duration::seconds(30));
        assert_eq!(
            service.resend_throttle(token.as_ref()),
            Throttle {
                reject: true,
                time_left_seconds: 30
            }
        );

        clock.advance(Duration::seconds(29));
        assert_eq!(
            service.resend_throttle(token.as_ref()),
            Throttle {
                reject: true,
                time_left_seconds: 1
            }
        );

        clock.advance(Duration::seconds(1));
        assert_eq!(
            service.resend_throttle(token.as_ref()),
            Throttle {
                reject: false,
                time_left_seconds: 0
            }
        );
    }

    #[actix_web::test]
    async fn throttle_never_rejects_a_missing_token() {
        let (service, _, _) = setup();

        assert_eq!(
            service.resend_throttle(None),
            Throttle {
                reject: false,
                time_left_seconds: 0
            }
        );
    }

    #[actix_web::test]
    async fn find_returns_the_latest_issuance() {
        let (service, clock, _) = setup();

        let first = service.issue("a@x.com").await.unwrap();
        clock.advance(Duration::minutes(2));
        let second = service.issue("a@x.com").await.unwrap();

        let latest = service.find("a@x.com", None).await.unwrap().unwrap();
        assert_eq!(latest.token, second);

        // narrowing by value still reaches the older row
        let narrowed = service
            .find("a@x.com", Some(first.as_str()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(narrowed.token, first);

        assert!(service.find("b@x.com", None).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn delete_of_an_absent_token_reports_failure() {
        let (service, _, store) = setup();
        service.issue("a@x.com").await.unwrap();

        let phantom = ResetToken {
            id: 99,
            email: "a@x.com".into(),
            token: "f".repeat(64),
            created_at: t0(),
        };

        assert!(!service.delete(&phantom).await.unwrap());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn delete_removes_the_exact_row() {
        let (service, _, store) = setup();
        let token = service.issue("a@x.com").await.unwrap();
        let found = service
            .find("a@x.com", Some(token.as_str()))
            .await
            .unwrap()
            .unwrap();

        assert!(service.delete(&found).await.unwrap());
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn validate_rejects_unknown_then_expired_then_accepts() {
        let (service, clock, _) = setup();
        let token = service.issue("a@x.com").await.unwrap();

        let err = service.validate("a@x.com", "deadbeef").await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));

        clock.advance(Duration::minutes(119));
        let ok = service.validate("a@x.com", &token).await.unwrap();
        assert_eq!(ok.token, token);

        clock.advance(Duration::minutes(2));
        let err = service.validate("a@x.com", &token).await.unwrap_err();
        assert!(matches!(err, ApiError::Expired(_)));
    }
}
