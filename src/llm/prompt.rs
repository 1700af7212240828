// src/llm/prompt.rs
// PromptBuilder: visitor inputs -> (system, user) instruction pairs per use case

use super::types::CompletionRequest;
use crate::config::Venue;
use crate::error::{MuseoError, Result};
use crate::profile::{ExitTicketRequest, VisitorProfile};

/// Tone rules shared by the itinerary persona
const ITINERARY_STYLE: &str = "Ensure your responses are accurate, thorough, and easy to understand. \
Be explicit about how your recommendation matches my child's interests, age, and learning goals. \
Provide complete, detailed recommendations for exhibits and scheduling, integrating daily show times. \
You are displaying this directly to the user, don't exclaim in response to the prompt. \
Don't use the word I and instead use second person. Directly address your users. \
Don't respond to me with \"Certainly\".";

/// Output shape requested of the model; not enforced locally
pub const ITINERARY_FORMAT: &str = "\"Number. Title - explanation\"";

/// A built (system, user) instruction pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn into_request(self, model: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(self.system, self.user, model)
    }
}

/// Builds prompts for one venue persona. Pure: no I/O, no state between calls.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    venue: Venue,
}

impl PromptBuilder {
    pub fn new(venue: Venue) -> Self {
        Self { venue }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    /// Hard time-budget sentence carried in every itinerary system prompt
    pub fn stay_constraint(stay_duration: &str) -> String {
        format!(
            "Ensure that the expected number of hours for the exhibits sums to {stay_duration} \
             and does not go over that."
        )
    }

    /// Itinerary planning prompt from the full profile
    pub fn itinerary(&self, profile: &VisitorProfile) -> Result<PromptPair> {
        require(&profile.stay_duration, "stay duration")?;
        require(&profile.language, "language")?;
        if profile.interests.is_empty() {
            return Err(MuseoError::Validation(
                "at least one interest is required".to_string(),
            ));
        }

        let Venue { platform, name, .. } = &self.venue;
        let system = format!(
            "You are an advanced AI working for {platform}, a platform dedicated to enhancing museum \
             visits using AI. You will speak in the language that the current user provides to you. \
             Your main task is to create user-friendly itineraries specifically for {name}, \
             factoring in user profiles (age, interests, learning goals, ETA, and estimated staying time). \
             {constraint} {ITINERARY_STYLE}",
            constraint = Self::stay_constraint(&profile.stay_duration),
        );

        let mut user = format!(
            "I am planning a trip to {name} with my child.\n\n\
             Child's Age: {age}\n\
             Interests: {interests}\n\
             Learning Goals: {goals}\n\
             Arrival Time (ETA): {eta}\n\
             Estimated Staying Time: {stay}\n\n",
            age = profile.age,
            interests = profile.interests_joined(),
            goals = profile.learning_goals,
            eta = profile.arrival_time,
            stay = profile.stay_duration,
        );
        if let Some(ref notes) = profile.accessibility_notes {
            user.push_str(&format!("Keep in mind my child's conditions: {notes}\n\n"));
        }
        user.push_str(&format!(
            "Generate a personalized museum itinerary tailored to this information. Include:\n\
             - Recommended exhibits in order, including why you chose each exhibit.\n\
             - Time estimates for each exhibit.\n\
             - Integration of daily show schedules.\n\
             - Any additional tips to maximize their visit.\n\n\
             Please respond to me in {language} for the rest of the conversation.\n\
             Always format your answer as:\n\
             {ITINERARY_FORMAT}\n",
            language = profile.language,
        ));

        Ok(PromptPair { system, user })
    }

    /// Single-turn question from a child; no history is threaded through
    pub fn question(&self, age: u32, question: &str) -> Result<PromptPair> {
        require(question, "question")?;
        let Venue { platform, name, .. } = &self.venue;

        let system = format!(
            "You are an educational AI chatbot for {platform}, designed to answer questions from \
             children visiting {name}. Your answers must be:\n\
             - Age-appropriate (based on my child's age)\n\
             - Friendly and engaging\n\
             - Factually correct\n\
             - Easy to understand\n\
             - Related to science, exhibits, or museum topics\n\
             Make learning fun and inspire curiosity in my child."
        );
        let user = format!(
            "My child, age {age}, is visiting {name} and asks: '{question}'\n\n\
             Please respond with a clear, fun explanation suitable for their age, and reference \
             any relevant exhibit or concept."
        );

        Ok(PromptPair { system, user })
    }

    /// Take-home exit ticket summarising the visit
    pub fn exit_ticket(&self, request: &ExitTicketRequest) -> Result<PromptPair> {
        if request.exhibits.is_empty() {
            return Err(MuseoError::Validation(
                "select at least one exhibit".to_string(),
            ));
        }
        let Venue {
            name, channel_url, ..
        } = &self.venue;

        let system = format!(
            "You are an AI assistant creating personalized exit tickets for young visitors at {name}. \
             Your goal is to reinforce learning by summarizing key takeaways, providing engaging \
             prompts for reflection, and recommending follow-up educational videos ONLY from \
             {name}'s official channel: {channel_url}.\n\n\
             All video recommendations MUST be from this channel."
        );
        let user = format!(
            "A {age}-year-old child visited {name} and explored the following topics:\n\
             {exhibits}\n\n\
             Their favorite part of the visit was: {favorite}\n\n\
             Create a fun, engaging exit ticket that includes:\n\
             - A summary of what they learned (simple language).\n\
             - A fun reflection question.\n\
             - A suggested activity to continue learning at home.",
            age = request.age,
            exhibits = request.exhibits_joined(),
            favorite = request.favorite_part,
        );

        Ok(PromptPair { system, user })
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(MuseoError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
