// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vendra demo` command implementation.
//!
//! Walks the core flows against the in-memory backend: open a
//! conversation panel, send as an agent (watching the server-side
//! auto-pause come back through the realtime channel), drive the
//! lifecycle, edit tags optimistically, and drag a lead across the
//! pipeline board including a rejected move with rollback.

use chrono::Utc;
use colored::Colorize;

use vendra_config::VendraConfig;
use vendra_core::VendraError;
use vendra_core::types::{
    ActorContext, ActorRole, AgentId, AgentRef, ChannelOrigin, ChatMessage, Conversation,
    ConversationId, ConversationStatus, LeadId, MessageId, MessagePart, MessageRole, StageId,
    TagId, TagRef, UserId,
};
use vendra_panel::{ConversationPanel, Inbox};
use vendra_pipeline::DragReconciler;
use vendra_test_utils::{MemoryBackend, board_fixture};

fn section(title: &str) {
    println!("\n{}", format!("== {title} ==").bold().cyan());
}

fn show_status(status: ConversationStatus) {
    println!("  estado: {}", status.to_string().yellow());
}

fn show_transcript(messages: &[ChatMessage]) {
    for msg in messages {
        let who = match msg.role {
            MessageRole::User => "lead".blue(),
            MessageRole::Assistant => "asistente".magenta(),
            MessageRole::Agent => "agente".green(),
            MessageRole::System => "sistema".dimmed(),
        };
        let text = match &msg.part {
            MessagePart::Text { text } => text.clone(),
            MessagePart::FunctionCall { name, .. } => format!("[llamada a función {name}]"),
            MessagePart::FunctionResponse { .. } => "[respuesta de función]".to_string(),
            MessagePart::ParseError { detail, .. } => format!("[payload degradado: {detail}]"),
        };
        println!("  {who}: {text}");
    }
}

fn seed(backend: &MemoryBackend) -> ConversationId {
    let conversation_id = ConversationId::from("conv-1001");
    backend.seed_conversation(Conversation {
        id: conversation_id.clone(),
        status: ConversationStatus::Automated,
        // The upstream store carries a free-form channel name.
        channel: ChannelOrigin::from_channel_name("WhatsApp"),
        assigned_agent: None,
        lead_id: LeadId::from("lead-ana"),
        lead_name: Some("Ana Torres".to_string()),
        updated_at: Utc::now(),
    });

    let history = [
        (MessageRole::User, "Hola, quiero informes del paquete web."),
        (
            MessageRole::Assistant,
            "¡Con gusto! Tenemos planes desde $4,500 MXN. ¿Te agendo una llamada?",
        ),
    ];
    for (i, (role, text)) in history.into_iter().enumerate() {
        backend.seed_message(ChatMessage {
            id: MessageId(format!("seed-{i}")),
            conversation_id: conversation_id.clone(),
            role,
            part: MessagePart::text(text),
            media: None,
            agent: None,
            created_at: Utc::now(),
        });
    }

    backend.seed_tag(TagRef {
        id: TagId::from("tag-vip"),
        name: "VIP".to_string(),
        color: Some("#6366f1".to_string()),
    });
    backend.seed_agent(
        &"biz-1".into(),
        &UserId::from("user-val"),
        AgentRef {
            id: AgentId::from("agent-val"),
            name: Some("Valeria".to_string()),
        },
    );
    backend.seed_board(board_fixture());
    conversation_id
}

pub async fn run(config: &VendraConfig) -> Result<(), VendraError> {
    println!(
        "{}",
        format!("vendra demo ({})", config.app.name).bold()
    );

    let backend = MemoryBackend::new();
    let conversation_id = seed(&backend);

    let scope = vendra_core::types::BusinessScope {
        business_id: "biz-1".into(),
        owner_id: UserId::from("owner-1"),
    };
    let actor = ActorContext {
        user_id: UserId::from("user-val"),
        display_name: "Valeria".to_string(),
        role: ActorRole::CrmAgent,
    };

    section("Abrir conversación");
    let mut panel = ConversationPanel::open(
        backend.actions(),
        backend.realtime().as_ref(),
        actor,
        scope.clone(),
        &conversation_id,
        config.inbox.history_limit,
    )
    .await?;
    show_status(panel.status());
    show_transcript(&panel.transcript());

    section("Responder como agente (el servidor pausa la automatización)");
    panel.send_message("¡Hola Ana! Soy Valeria, te comparto los detalles.").await?;
    show_status(panel.status());

    section("Pausa explícita e intento inválido de reanudar dos veces");
    panel.pause().await?;
    show_status(panel.status());
    panel.resume().await?;
    show_status(panel.status());
    match panel.resume().await {
        Err(e) => println!("  rechazado localmente: {}", e.to_string().red()),
        Ok(_) => println!("  {}", "inesperado: la transición pasó".red()),
    }

    section("Etiquetas con actualización optimista");
    panel.toggle_tag(&TagId::from("tag-vip")).await?;
    println!("  etiquetas: {:?}", panel.selected_tags());

    section("Archivar y desarchivar");
    panel.archive().await?;
    show_status(panel.status());
    panel.unarchive().await?;
    show_status(panel.status());
    show_transcript(&panel.transcript());

    section("Tablero: mover lead entre columnas");
    let mut reconciler = DragReconciler::load(
        backend.actions(),
        scope.business_id.clone(),
        config.board.refresh_after_move,
    )
    .await?;
    reconciler.begin_drag(&LeadId::from("l1"))?;
    reconciler
        .complete_drag(&StageId::from("contactado"), 0)
        .await?;
    for column in &reconciler.board().columns {
        let ids: Vec<_> = column.leads.iter().map(|l| l.id.0.as_str()).collect();
        println!("  {}: {ids:?}", column.name.green());
    }

    section("Tablero: rechazo del servidor y rollback");
    backend.fail_next("move_lead_to_stage");
    reconciler.begin_drag(&LeadId::from("l2"))?;
    match reconciler.complete_drag(&StageId::from("contactado"), 0).await {
        Err(e) => println!("  movimiento rechazado: {}", e.to_string().red()),
        Ok(_) => println!("  {}", "inesperado: el movimiento pasó".red()),
    }
    for column in &reconciler.board().columns {
        let ids: Vec<_> = column.leads.iter().map(|l| l.id.0.as_str()).collect();
        println!("  {}: {ids:?}", column.name.green());
    }

    section("Bandeja de entrada");
    let mut inbox = Inbox::new(
        backend.actions(),
        scope.business_id,
        config.inbox.list_limit,
        config.inbox.preview_length,
    );
    inbox.refresh().await?;
    for item in inbox.items() {
        println!(
            "  [{}] {}: {}",
            item.status.to_string().yellow(),
            item.lead_name.bold(),
            item.preview
        );
    }

    println!("\n{}", "demo completa".bold().green());
    Ok(())
}
