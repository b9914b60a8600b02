//! Tratamento de consultas do assistente de atendimento.
//!
//! Uma consulta passa por `received → kb_matched | ai_generated`, e uma
//! resposta gerada termina como `ai_resolved` ou `escalated`. Respostas
//! humanas são uma transição separada que pode ensinar a base de conhecimento.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::analytics::{Analytics, AnalyticsSnapshot};
use crate::completion::{self, fallback_reply, CompletionService, CONNECTION_FALLBACK};
use crate::conversation::{
    Conversation, ConversationStore, EscalatedSession, Message, ReplyPlacement, SessionIssuer,
    UuidIssuer, ESCALATION_NOTICE,
};
use crate::knowledge::{
    Clock, ConfidenceEstimator, FeedbackLearner, KnowledgeBase, KnowledgeRecord, RandomSource,
    SystemClock, ThreadRandom, LEARN_THRESHOLD, MATCH_THRESHOLD,
};
use crate::types::config::Config;
use crate::SupportResult;

/// Confiança informada para uma resposta vinda da base de conhecimento.
pub const KB_MATCH_CONFIDENCE: f64 = 0.9;

/// Respostas geradas abaixo desta confiança são escaladas.
pub const ESCALATION_THRESHOLD: f64 = 0.5;

/// Tempo máximo padrão da etapa de completação, incluindo retentativas.
pub const DEFAULT_COMPLETION_BUDGET: Duration = Duration::from_secs(60);

/// Como uma consulta foi resolvida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Respondida pela base de conhecimento.
    KbMatched,
    /// Respondida pelo serviço de completação com confiança suficiente.
    AiResolved,
    /// Repassada para um humano.
    Escalated,
}

/// O que o chamador recebe de uma consulta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReply {
    pub response: String,
    pub confidence: f64,
    pub needs_human: bool,
    pub outcome: QueryOutcome,
}

/// Resultado do envio de uma resposta humana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HumanAnswerOutcome {
    /// Indica se um novo registro de conhecimento foi criado.
    pub learned: bool,
    pub placement: ReplyPlacement,
}

/// O assistente de atendimento.
///
/// Dono da base de conhecimento, das conversas e dos contadores; tudo é
/// injetado na construção e assistentes distintos nunca compartilham estado.
pub struct SupportAssistant {
    knowledge: Arc<RwLock<KnowledgeBase>>,
    conversations: Arc<ConversationStore>,
    analytics: Arc<Analytics>,
    completion: Arc<dyn CompletionService>,
    confidence: ConfidenceEstimator,
    learner: FeedbackLearner,
    escalation_threshold: f64,
    completion_budget: Duration,
}

impl SupportAssistant {
    /// Inicia um builder em volta de um backend de completação.
    pub fn builder(completion: Arc<dyn CompletionService>) -> SupportAssistantBuilder {
        SupportAssistantBuilder::new(completion)
    }

    /// Cria um assistente a partir da configuração, incluindo o backend de completação.
    pub fn from_config(config: &Config) -> SupportResult<Self> {
        let completion = completion::from_config(&config.completion)?;

        Ok(Self::builder(completion)
            .seed_samples(config.knowledge.seed_samples)
            .match_threshold(config.knowledge.match_threshold)
            .learn_threshold(config.knowledge.learn_threshold)
            .escalation_threshold(config.escalation.confidence_threshold)
            .completion_budget(Duration::from_secs(config.general.timeout_secs))
            .build())
    }

    /// Abre uma nova sessão.
    pub async fn create_session(&self) -> String {
        self.conversations.create_session().await
    }

    /// Responde uma mensagem do usuário em `session_id`, criando a sessão se desconhecida.
    ///
    /// Nunca falha: erros de completação viram uma resposta de fallback.
    pub async fn handle_query(&self, session_id: &str, message: &str) -> QueryReply {
        let mut conversation = self.conversations.lock_or_create(session_id).await;

        conversation.push(Message::user(message));
        self.analytics.record_query();

        let matched = {
            let knowledge = self.knowledge.read().await;
            knowledge
                .find_best_match(message)
                .map(|record| record.answer.clone())
        };

        if let Some(answer) = matched {
            tracing::info!(session_id = %session_id, "Answered from knowledge base");
            conversation.push(Message::assistant(answer.clone()));
            self.analytics.record_ai_resolved();

            return QueryReply {
                response: answer,
                confidence: KB_MATCH_CONFIDENCE,
                needs_human: false,
                outcome: QueryOutcome::KbMatched,
            };
        }

        let draft = self.generate(conversation.messages()).await;

        let confidence = {
            let knowledge = self.knowledge.read().await;
            self.confidence.estimate(&knowledge, message, &draft)
        };

        conversation.push(Message::assistant(draft.clone()));

        if confidence < self.escalation_threshold {
            tracing::info!(
                session_id = %session_id,
                confidence,
                threshold = self.escalation_threshold,
                "Escalating to a human agent"
            );

            return QueryReply {
                response: ESCALATION_NOTICE.to_string(),
                confidence,
                needs_human: true,
                outcome: QueryOutcome::Escalated,
            };
        }

        tracing::info!(session_id = %session_id, confidence, "Answered by completion service");
        self.analytics.record_ai_resolved();

        QueryReply {
            response: draft,
            confidence,
            needs_human: false,
            outcome: QueryOutcome::AiResolved,
        }
    }

    /// Registra uma resposta humana a `question` em `session_id`.
    ///
    /// A resposta automática que seguiu a pergunta é comparada com a
    /// humana; uma resposta diferente o bastante vira novo registro de conhecimento.
    /// Falha com `SessionNotFound` para sessões desconhecidas, sem efeitos colaterais.
    pub async fn handle_human_answer(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
    ) -> SupportResult<HumanAnswerOutcome> {
        let mut conversation = self.conversations.lock(session_id).await?;

        let ai_answer = conversation.reply_to(question).unwrap_or_default().to_string();

        let learned = {
            let mut knowledge = self.knowledge.write().await;
            self.learner.learn(&mut knowledge, question, &ai_answer, answer)
        };

        let placement = conversation.replace_or_append_assistant_reply(question, answer);

        self.analytics.record_human_resolved();
        if learned {
            self.analytics.record_learning_event();
        }

        tracing::info!(
            session_id = %session_id,
            learned,
            placement = ?placement,
            "Human answer recorded"
        );

        Ok(HumanAnswerOutcome { learned, placement })
    }

    /// Conversas aguardando humano, em ordem de criação.
    pub async fn tickets(&self) -> Vec<EscalatedSession> {
        self.conversations.list_escalated().await
    }

    /// Cópia de uma conversa.
    pub async fn conversation(&self, session_id: &str) -> Option<Conversation> {
        self.conversations.get(session_id).await
    }

    /// Contadores atuais.
    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.snapshot()
    }

    /// Cópia de todos os registros de conhecimento, em ordem de inserção.
    pub async fn knowledge(&self) -> Vec<KnowledgeRecord> {
        self.knowledge.read().await.records().to_vec()
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn completion(&self) -> &Arc<dyn CompletionService> {
        &self.completion
    }

    pub fn escalation_threshold(&self) -> f64 {
        self.escalation_threshold
    }

    /// Executa o backend de completação dentro do tempo máximo, degradando em caso de falha.
    async fn generate(&self, history: &[Message]) -> String {
        match tokio::time::timeout(self.completion_budget, self.completion.complete(history)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(backend = self.completion.name(), error = %e, "Completion failed");
                fallback_reply(&e).to_string()
            }
            Err(_) => {
                tracing::warn!(
                    backend = self.completion.name(),
                    budget_secs = self.completion_budget.as_secs_f64(),
                    "Completion exceeded its budget"
                );
                CONNECTION_FALLBACK.to_string()
            }
        }
    }
}

/// Builder de [`SupportAssistant`].
pub struct SupportAssistantBuilder {
    completion: Arc<dyn CompletionService>,
    knowledge: Option<KnowledgeBase>,
    issuer: Arc<dyn SessionIssuer>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    analytics: Arc<Analytics>,
    seed_samples: bool,
    match_threshold: f64,
    learn_threshold: f64,
    escalation_threshold: f64,
    completion_budget: Duration,
}

impl SupportAssistantBuilder {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            knowledge: None,
            issuer: Arc::new(UuidIssuer),
            random: Arc::new(ThreadRandom),
            clock: Arc::new(SystemClock),
            analytics: Arc::new(Analytics::new()),
            seed_samples: true,
            match_threshold: MATCH_THRESHOLD,
            learn_threshold: LEARN_THRESHOLD,
            escalation_threshold: ESCALATION_THRESHOLD,
            completion_budget: DEFAULT_COMPLETION_BUDGET,
        }
    }

    /// Usa uma base de conhecimento pronta em vez de uma nova.
    ///
    /// Ignora `seed_samples` e `match_threshold`.
    pub fn knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn session_issuer(mut self, issuer: Arc<dyn SessionIssuer>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn analytics(mut self, analytics: Arc<Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn seed_samples(mut self, seed: bool) -> Self {
        self.seed_samples = seed;
        self
    }

    pub fn match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub fn learn_threshold(mut self, threshold: f64) -> Self {
        self.learn_threshold = threshold;
        self
    }

    pub fn escalation_threshold(mut self, threshold: f64) -> Self {
        self.escalation_threshold = threshold;
        self
    }

    pub fn completion_budget(mut self, budget: Duration) -> Self {
        self.completion_budget = budget;
        self
    }

    pub fn build(self) -> SupportAssistant {
        let knowledge = match self.knowledge {
            Some(knowledge) => knowledge,
            None => {
                let mut knowledge = KnowledgeBase::with_threshold(self.match_threshold);
                if self.seed_samples {
                    knowledge.seed_samples(self.clock.today());
                }
                knowledge
            }
        };

        tracing::debug!(
            records = knowledge.len(),
            backend = self.completion.name(),
            "Support assistant ready"
        );

        SupportAssistant {
            knowledge: Arc::new(RwLock::new(knowledge)),
            conversations: Arc::new(ConversationStore::new(self.issuer)),
            analytics: self.analytics,
            completion: self.completion,
            confidence: ConfidenceEstimator::new(self.random),
            learner: FeedbackLearner::with_threshold(self.clock, self.learn_threshold),
            escalation_threshold: self.escalation_threshold,
            completion_budget: self.completion_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::PROCESSING_FALLBACK;
    use crate::knowledge::{FixedClock, FixedRandom, SAMPLE_KNOWLEDGE};
    use crate::SupportError;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    enum Behavior {
        Reply(&'static str),
        Malformed,
        Hang,
    }

    struct StubCompletion(Behavior);

    #[async_trait]
    impl CompletionService for StubCompletion {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _history: &[Message]) -> SupportResult<String> {
            match self.0 {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Malformed => Err(SupportError::CompletionMalformed(
                    "stub".into(),
                    "{}".into(),
                )),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
            }
        }
    }

    const LONG_REPLY: &str = "Damaged parcels can be returned free of charge from your order page.";

    fn assistant(behavior: Behavior, random: f64) -> SupportAssistant {
        SupportAssistant::builder(Arc::new(StubCompletion(behavior)))
            .random(Arc::new(FixedRandom(random)))
            .clock(Arc::new(FixedClock(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )))
            .build()
    }

    #[tokio::test]
    async fn test_kb_match() {
        let assistant = assistant(Behavior::Reply("unused"), 0.6);

        let reply = assistant
            .handle_query("s1", "how do I reset my password")
            .await;

        assert_eq!(reply.outcome, QueryOutcome::KbMatched);
        assert_eq!(reply.response, SAMPLE_KNOWLEDGE[0].1);
        assert_eq!(reply.confidence, KB_MATCH_CONFIDENCE);
        assert!(!reply.needs_human);

        let analytics = assistant.analytics();
        assert_eq!(analytics.total_queries, 1);
        assert_eq!(analytics.ai_resolved, 1);
        assert_eq!(assistant.conversation("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_short_reply_escalates() {
        let assistant = assistant(Behavior::Reply("No idea."), 0.6);

        let reply = assistant.handle_query("s1", "my parcel arrived damaged").await;

        assert_eq!(reply.outcome, QueryOutcome::Escalated);
        assert_eq!(reply.response, ESCALATION_NOTICE);
        assert!(reply.needs_human);
        assert!((reply.confidence - 0.3).abs() < f64::EPSILON);

        let analytics = assistant.analytics();
        assert_eq!(analytics.total_queries, 1);
        assert_eq!(analytics.ai_resolved, 0);

        // O rascunho é o que fica armazenado
        let conversation = assistant.conversation("s1").await.unwrap();
        assert_eq!(conversation.last(), Some(&Message::assistant("No idea.")));
    }

    #[tokio::test]
    async fn test_confident_generation_resolves() {
        let assistant = assistant(Behavior::Reply(LONG_REPLY), 0.65);

        let reply = assistant.handle_query("s1", "my parcel arrived damaged").await;

        assert_eq!(reply.outcome, QueryOutcome::AiResolved);
        assert_eq!(reply.response, LONG_REPLY);
        assert!((reply.confidence - 0.65).abs() < f64::EPSILON);
        assert_eq!(assistant.analytics().ai_resolved, 1);
    }

    #[tokio::test]
    async fn test_unlucky_draw_escalates() {
        let assistant = assistant(Behavior::Reply(LONG_REPLY), 0.2);

        let reply = assistant.handle_query("s1", "my parcel arrived damaged").await;

        assert!(reply.needs_human);
        assert_eq!(assistant.analytics().ai_resolved, 0);
    }

    #[tokio::test]
    async fn test_completion_failure_degrades() {
        let assistant = assistant(Behavior::Malformed, 0.6);

        let reply = assistant.handle_query("s1", "my parcel arrived damaged").await;

        assert_eq!(reply.response, PROCESSING_FALLBACK);
        assert_eq!(reply.outcome, QueryOutcome::AiResolved);
    }

    #[tokio::test]
    async fn test_completion_budget() {
        let assistant = SupportAssistant::builder(Arc::new(StubCompletion(Behavior::Hang)))
            .random(Arc::new(FixedRandom(0.2)))
            .completion_budget(Duration::from_millis(20))
            .build();

        let reply = assistant.handle_query("s1", "my parcel arrived damaged").await;

        assert!(reply.needs_human);
        let conversation = assistant.conversation("s1").await.unwrap();
        assert_eq!(conversation.last(), Some(&Message::assistant(CONNECTION_FALLBACK)));
    }

    #[tokio::test]
    async fn test_human_answer_unknown_session() {
        let assistant = assistant(Behavior::Reply("unused"), 0.6);

        let result = assistant.handle_human_answer("ghost", "q", "a").await;

        assert!(matches!(result, Err(SupportError::SessionNotFound(_))));
        assert_eq!(assistant.analytics(), AnalyticsSnapshot::default());
        assert_eq!(assistant.knowledge().await.len(), 3);
    }

    #[tokio::test]
    async fn test_human_answer_teaches_knowledge_base() {
        let assistant = assistant(Behavior::Reply("No idea."), 0.6);
        let question = "my parcel arrived damaged";
        assistant.handle_query("s1", question).await;

        let outcome = assistant
            .handle_human_answer("s1", question, "We will ship a replacement parcel today at no cost.")
            .await
            .unwrap();

        assert!(outcome.learned);
        assert_eq!(outcome.placement, ReplyPlacement::Replaced(1));

        let knowledge = assistant.knowledge().await;
        assert_eq!(knowledge.len(), 4);
        assert_eq!(knowledge[3].source_answer.as_deref(), Some("No idea."));
        assert_eq!(knowledge[3].created_at, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let analytics = assistant.analytics();
        assert_eq!(analytics.human_resolved, 1);
        assert_eq!(analytics.learning_events, 1);

        // A mesma pergunta agora é respondida pela base de conhecimento
        let reply = assistant.handle_query("s2", question).await;
        assert_eq!(reply.outcome, QueryOutcome::KbMatched);
        assert_eq!(reply.response, "We will ship a replacement parcel today at no cost.");
    }

    #[tokio::test]
    async fn test_matching_human_answer_is_not_learned() {
        let assistant = assistant(Behavior::Reply(LONG_REPLY), 0.2);
        assistant.handle_query("s1", "my parcel arrived damaged").await;

        let outcome = assistant
            .handle_human_answer("s1", "my parcel arrived damaged", LONG_REPLY)
            .await
            .unwrap();

        assert!(!outcome.learned);
        assert_eq!(assistant.knowledge().await.len(), 3);

        let analytics = assistant.analytics();
        assert_eq!(analytics.human_resolved, 1);
        assert_eq!(analytics.learning_events, 0);
    }

    #[tokio::test]
    async fn test_human_answer_to_last_question_is_appended() {
        let assistant = assistant(Behavior::Reply("unused"), 0.6);
        let session = assistant.create_session().await;
        assistant
            .conversations()
            .append_message(&session, crate::conversation::Role::User, "Can I pay by check?")
            .await;

        let outcome = assistant
            .handle_human_answer(&session, "Can I pay by check?", "Checks are not accepted.")
            .await
            .unwrap();

        assert_eq!(outcome.placement, ReplyPlacement::Appended);
        assert!(outcome.learned);
        let conversation = assistant.conversation(&session).await.unwrap();
        assert_eq!(conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_seeding() {
        let assistant = SupportAssistant::builder(Arc::new(StubCompletion(Behavior::Reply("x"))))
            .seed_samples(false)
            .build();

        assert!(assistant.knowledge().await.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_run_concurrently() {
        let assistant = Arc::new(assistant(Behavior::Reply(LONG_REPLY), 0.6));
        let mut handles = Vec::new();

        for i in 0..8 {
            let assistant = assistant.clone();
            handles.push(tokio::spawn(async move {
                let session = format!("s{}", i % 2);
                assistant.handle_query(&session, "my parcel arrived damaged").await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(assistant.analytics().total_queries, 8);
        assert_eq!(assistant.conversation("s0").await.unwrap().len(), 8);
        assert_eq!(assistant.conversation("s1").await.unwrap().len(), 8);
    }
}
