#[cfg(test)]
mod tests {
    use chrono::Utc;
    use plugin_registry_sdk::models::{
        PluginScope, Subscription, SubscriptionStatus, TenantEnablement,
    };
    use uuid::Uuid;

    use super::super::entity::{
        plan, plugin_subscription, plugin_tenant, types, uuids_from_json, uuids_to_json,
    };

    #[test]
    fn plan_model_maps_to_sdk_plan() {
        let now = Utc::now();
        let model = plan::Model {
            id: Uuid::new_v4(),
            plugin_id: Uuid::new_v4(),
            name: "pro".to_owned(),
            billing_period: types::BillingPeriod::Quarterly,
            is_free: false,
            has_trial: true,
            trial_days: Some(30),
            has_limitations: true,
            limitations: Some(serde_json::json!({"maxActiveUsers": 25})),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let plan: plugin_registry_sdk::models::Plan = model.clone().into();

        assert_eq!(plan.id, model.id);
        assert_eq!(
            plan.billing_period,
            plugin_registry_sdk::models::BillingPeriod::Quarterly
        );
        assert_eq!(plan.trial_days, Some(30));
        assert_eq!(plan.limitation_i32("maxActiveUsers"), Some(25));
    }

    #[test]
    fn enablement_round_trips_through_the_active_model() {
        let now = Utc::now();
        let allowed = vec![Uuid::new_v4(), Uuid::new_v4()];
        let denied = vec![Uuid::new_v4()];

        let record = TenantEnablement {
            id: Uuid::new_v4(),
            plugin_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            organization_id: Some(Uuid::new_v4()),
            scope: PluginScope::Organization,
            enabled: true,
            auto_install: true,
            requires_approval: true,
            is_mandatory: false,
            max_installations: Some(-1),
            max_active_users: Some(10),
            current_installations: 2,
            current_active_users: 3,
            tenant_configuration: None,
            preferences: None,
            allowed_role_ids: Vec::new(),
            allowed_user_ids: allowed.clone(),
            denied_user_ids: denied.clone(),
            approved_by_id: Some(Uuid::new_v4()),
            approved_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let active = plugin_tenant::ActiveModel::from(record.clone());
        let model = plugin_tenant::Model {
            id: record.id,
            plugin_id: record.plugin_id,
            tenant_id: record.tenant_id,
            organization_id: record.organization_id,
            scope: types::Scope::Organization,
            enabled: true,
            auto_install: true,
            requires_approval: true,
            is_mandatory: false,
            max_installations: Some(-1),
            max_active_users: Some(10),
            current_installations: 2,
            current_active_users: 3,
            tenant_configuration: None,
            preferences: None,
            allowed_role_ids: Some(uuids_to_json(&[])),
            allowed_user_ids: Some(uuids_to_json(&allowed)),
            denied_user_ids: Some(uuids_to_json(&denied)),
            approved_by_id: record.approved_by_id,
            approved_at: record.approved_at,
            created_at: now,
            updated_at: now,
        };

        // the active model carries the same JSON the stored model holds
        assert_eq!(
            active.allowed_user_ids,
            sea_orm::ActiveValue::Set(model.allowed_user_ids.clone())
        );

        let back: TenantEnablement = model.into();
        assert_eq!(back, record);
    }

    #[test]
    fn subscription_model_maps_status_and_scope() {
        let now = Utc::now();
        let model = plugin_subscription::Model {
            id: Uuid::new_v4(),
            plugin_id: Uuid::new_v4(),
            plugin_tenant_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            organization_id: None,
            subscriber_id: Some(Uuid::new_v4()),
            plan_id: None,
            scope: types::Scope::User,
            status: types::SubscriptionStatus::Trial,
            start_date: now,
            end_date: Some(now),
            auto_renew: true,
            payment_method: None,
            metadata: Some(serde_json::json!({"promoCode": "X"})),
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let sub: Subscription = model.into();

        assert_eq!(sub.scope, PluginScope::User);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(
            sub.metadata.unwrap().get("promoCode"),
            Some(&serde_json::json!("X"))
        );
    }

    #[test]
    fn uuid_lists_survive_json_and_skip_garbage() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let json = uuids_to_json(&ids);
        assert_eq!(uuids_from_json(Some(&json)), ids);

        assert!(uuids_from_json(None).is_empty());
        let garbage = serde_json::json!(["not-a-uuid", 42, null]);
        assert!(uuids_from_json(Some(&garbage)).is_empty());
    }
}
