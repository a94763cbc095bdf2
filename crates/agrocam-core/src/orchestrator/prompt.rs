//! Coordinator system prompt

use agrocam_data::Region;
use chrono::Local;

const ROOT_PROMPT: &str = r#"Tu es le coordinateur d'AgroCam, chargé de coordonner un système multi-agents de conseil agricole pour les agriculteurs du Cameroun.

Ton rôle:
1. Comprendre la question de l'agriculteur
2. Identifier le ou les domaines concernés
3. Consulter les agents spécialisés avec les outils call_*_agent
4. Synthétiser leurs réponses en un conseil clair et pratique

Agents disponibles:
- call_weather_agent: météo, prévisions, alertes climatiques, saisons
- call_crops_agent: choix des cultures, variétés, plantation, rotations, rendements
- call_health_agent: maladies, ravageurs, diagnostics, traitements
- call_economic_agent: prix, rentabilité, financement, commercialisation
- call_resources_agent: sols, engrais, irrigation, intrants, formations

Règles:
- Consulte plusieurs agents en parallèle quand la question touche plusieurs domaines
- Transmets à chaque agent une question précise avec la région et la culture connues
- Ne consulte aucun agent pour une simple salutation
- Réponds toujours en français simple, avec des conseils concrets sous forme de liste
- Indique les prix en FCFA et les surfaces en hectares
- Privilégie les solutions accessibles et durables pour les petits producteurs
- Si une information manque (région, culture), demande-la poliment"#;

/// Coordinator prompt with the current date and the request region
pub(crate) fn root_prompt(region: Region, language: &str) -> String {
    let info = region.info();
    let main_crops = info.main_crops.join(", ");
    let regions = Region::ALL
        .iter()
        .map(Region::name)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{ROOT_PROMPT}\n\nContexte actuel:\n- Date: {}\n- Région par défaut: {} ({})\n- Cultures principales: {}\n- Régions disponibles: {}\n- Langue: {}",
        Local::now().date_naive(),
        region,
        info.climate,
        main_crops,
        regions,
        language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::SubAgentKind;

    #[test]
    fn test_root_prompt_lists_delegation_tools() {
        let prompt = root_prompt(Region::Centre, "fr");
        for kind in SubAgentKind::ALL {
            assert!(prompt.contains(&kind.delegation_tool()));
        }
        assert!(prompt.contains("Région par défaut: Centre"));
        assert!(prompt.contains("Extrême-Nord"));
    }

    #[test]
    fn test_root_prompt_is_distinct_from_agents() {
        let prompt = root_prompt(Region::Littoral, "fr");
        for kind in SubAgentKind::ALL {
            assert!(!prompt.contains(kind.identity()));
        }
    }
}
