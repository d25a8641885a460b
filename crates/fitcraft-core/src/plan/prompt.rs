//! Prompt construction for plan generation.
//!
//! The system prompt fixes the JSON output contract and either restricts the
//! model to a supplied exercise listing or tells it to fall back to common
//! exercises. This module is pure string building.

/// Heading that introduces the catalog listing in the system prompt.
pub const CATALOG_HEADING: &str = "LISTA DE EXERCÍCIOS DISPONÍVEIS:";

/// Instruction used when no catalog listing is supplied.
pub const FALLBACK_INSTRUCTION: &str = "Use exercícios de musculação comuns e populares.";

/// Instruction that accompanies a catalog listing.
pub const CATALOG_ONLY_INSTRUCTION: &str =
    "Use APENAS exercícios desta lista, escrevendo o nome exatamente como aparece nela.";

const ROLE: &str = "Você é um personal trainer de elite, especialista em criar treinos de \
musculação eficazes e seguros.\n\
Sua tarefa é criar um plano de treino completo baseado nas instruções do usuário.\n\n";

/// Output contract: JSON only, with the exact plan shape.
const OUTPUT_RULES: &str = r#"REGRAS OBRIGATÓRIAS:
1.  Sua resposta final deve ser APENAS o código JSON, sem nenhuma palavra, explicação ou comentário antes ou depois.
2.  A estrutura do JSON deve ser exatamente esta:
    {
      "nome_ficha": "Nome do Treino Sugerido pela IA",
      "dias_treino": [
        {
          "dia": "A",
          "grupo_muscular": "Peito e Tríceps",
          "exercicios": [
            { "nome": "Supino Reto", "series": "4", "repeticoes": "8-12", "tecnica_avancada": "Nenhuma" }
          ]
        }
      ]
    }
"#;

/// Build the system prompt.
///
/// A `catalog_listing` that is absent or blank selects the fallback
/// instruction; otherwise the listing is embedded verbatim.
pub fn build_system_prompt(catalog_listing: Option<&str>) -> String {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(ROLE);
    prompt.push_str(OUTPUT_RULES);
    prompt.push('\n');

    match catalog_listing.filter(|l| !l.trim().is_empty()) {
        Some(listing) => {
            prompt.push_str(CATALOG_HEADING);
            prompt.push('\n');
            prompt.push_str(listing);
            prompt.push_str("\n\n");
            prompt.push_str(CATALOG_ONLY_INSTRUCTION);
            prompt.push('\n');
        }
        None => {
            prompt.push_str(FALLBACK_INSTRUCTION);
            prompt.push('\n');
        }
    }

    prompt
}

/// Build the user message that carries the trainer's request.
pub fn build_user_prompt(training_prompt: &str) -> String {
    format!("Com base nas regras, crie o seguinte treino: {training_prompt}")
}
