//! System prompt assembly for the text reply.

use crate::types::ListingSummary;

/// Base persona for the assistant.
const PERSONA: &str = "Eres el asistente de reservas de una empresa de alquiler de fincas \
vacacionales en Colombia. Respondes por WhatsApp en español, con mensajes cortos y amables. \
Ayudas a los clientes a encontrar finca, consultar disponibilidad y resolver dudas sobre \
las propiedades. Si no sabes algo, dilo y ofrece pasar la conversación a un asesor.";

/// Context gathered before generating the text reply.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Retrieved knowledge snippets.
    pub knowledge: Vec<String>,
    /// Listings matched by the current message.
    pub listings: Vec<ListingSummary>,
    /// Whether a catalog card was just sent for this message.
    pub card_sent: bool,
    /// Title of the single listing whose card was sent, when applicable.
    pub card_listing_title: Option<String>,
}

impl PromptContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }
}

/// One-line summary of a listing for the prompt.
fn listing_line(listing: &ListingSummary) -> String {
    let mut line = format!(
        "- {} ({}): ${} por noche",
        listing.name, listing.location, listing.price_base
    );
    if let Some(capacity) = listing.capacity {
        line.push_str(&format!(", capacidad {} personas", capacity));
    }
    if !listing.description.is_empty() {
        line.push_str(&format!(". {}", listing.description));
    }
    line
}

/// Assemble the system prompt from persona, knowledge, listings, and the
/// card-sending hints.
pub fn build_system_prompt(context: &PromptContext) -> String {
    let mut prompt = String::from(PERSONA);

    if !context.knowledge.is_empty() {
        prompt.push_str("\n\n[INFORMACION]\n");
        for snippet in &context.knowledge {
            prompt.push_str("- ");
            prompt.push_str(snippet);
            prompt.push('\n');
        }
    }

    if !context.listings.is_empty() {
        prompt.push_str("\n[FINCAS]\n");
        for listing in &context.listings {
            prompt.push_str(&listing_line(listing));
            prompt.push('\n');
        }
    }

    prompt.push_str("\n[INSTRUCCIONES]\n");
    prompt.push_str("- La conversación ya está iniciada: no repitas el saludo de bienvenida.\n");

    if context.card_sent {
        match &context.card_listing_title {
            Some(title) => {
                prompt.push_str(&format!(
                    "- Ya se envió la ficha de \"{}\" en este mensaje; responde breve y no \
                     repitas su información ni pidas fechas de nuevo.\n",
                    title
                ));
            }
            None => {
                prompt.push_str(
                    "- Ya se envió un catálogo de opciones en este mensaje; responde breve y \
                     no repitas la lista.\n",
                );
            }
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingSummary {
        ListingSummary {
            id: "p1".to_string(),
            name: "Villa Green".to_string(),
            location: "Restrepo".to_string(),
            price_base: 500_000,
            capacity: Some(10),
            description: "Piscina privada".to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_sections() {
        let context = PromptContext {
            knowledge: vec!["Se permite el ingreso de mascotas".to_string()],
            listings: vec![listing()],
            card_sent: false,
            card_listing_title: None,
        };

        let prompt = build_system_prompt(&context);
        assert!(prompt.contains("[INFORMACION]"));
        assert!(prompt.contains("mascotas"));
        assert!(prompt.contains("Villa Green"));
        assert!(prompt.contains("no repitas el saludo"));
    }

    #[test]
    fn test_prompt_card_hint_names_listing() {
        let context = PromptContext {
            knowledge: Vec::new(),
            listings: vec![listing()],
            card_sent: true,
            card_listing_title: Some("Villa Green".to_string()),
        };

        let prompt = build_system_prompt(&context);
        assert!(prompt.contains("ficha de \"Villa Green\""));
        assert!(prompt.contains("no repitas su información"));
    }

    #[test]
    fn test_prompt_omits_empty_sections() {
        let prompt = build_system_prompt(&PromptContext::new());
        assert!(!prompt.contains("[INFORMACION]"));
        assert!(!prompt.contains("[FINCAS]"));
        assert!(prompt.contains("[INSTRUCCIONES]"));
    }
}
