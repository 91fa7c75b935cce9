use crate::session::{SessionToken, SESSION_TOKEN_LENGTH};
use rand::distributions::{Alphanumeric, DistString};
use std::fmt::{Debug, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A type with the ability to generate session tokens.
///
/// Generators are shared between concurrently running requests, so generation takes `&self`.
pub trait SessionTokenGenerator: Debug + Send + Sync {
    /// Generate a token, i.e. a string that is a valid HTTP cookie value
    /// of exactly [`SESSION_TOKEN_LENGTH`] ASCII alphanumeric characters.
    fn generate_token(&self) -> SessionToken;
}

/// The default token generator with focus on security.
/// It uses [rand::thread_rng] as a random source and the [Alphanumeric] distribution to generate token strings.
/// This gives `log_2(26+26+10) ≥ 5.95` bits of entropy per character.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSessionTokenGenerator;

impl SessionTokenGenerator for DefaultSessionTokenGenerator {
    fn generate_token(&self) -> SessionToken {
        // According to the docs of the rand crate, thread_rng() is cryptographically secure.
        let mut rng = rand::thread_rng();
        SessionToken::from_generated(Alphanumeric.sample_string(&mut rng, SESSION_TOKEN_LENGTH))
    }
}

/// A debug token generator that generates an ascending sequence of integers, formatted as strings padded with zeroes.
///
/// **Never use this in production.** The tokens are trivially guessable.
/// Every constructor logs a warning.
#[derive(Debug)]
pub struct DebugSessionTokenGenerator {
    next_index: AtomicUsize,
}

impl DebugSessionTokenGenerator {
    /// Create a debug generator starting at zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a debug generator whose first token is the given index.
    pub fn starting_at(next_index: usize) -> Self {
        log::warn!("Using the predictable debug session token generator, do not use this in production");
        Self {
            next_index: AtomicUsize::new(next_index),
        }
    }

    /// Format the token with the given index, without advancing the generator.
    pub fn token_at(index: usize) -> SessionToken {
        let mut token = String::with_capacity(SESSION_TOKEN_LENGTH);
        // Writing to a String cannot fail.
        let _ = write!(&mut token, "{:0width$}", index, width = SESSION_TOKEN_LENGTH);
        SessionToken::from_generated(token)
    }
}

impl SessionTokenGenerator for DebugSessionTokenGenerator {
    fn generate_token(&self) -> SessionToken {
        Self::token_at(self.next_index.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DebugSessionTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
