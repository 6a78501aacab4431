#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{Months, Utc};
    use plugin_registry_sdk::models::{
        AccessQuery, BillingPeriod, CreateTenantEnablement, PluginScope, SubscriptionStatus,
        UsageAction, UserListOp, PROMO_CODE_KEY,
    };
    use uuid::Uuid;

    use crate::domain::error::DomainError;
    use crate::domain::testing::{
        enablement_fixture, plan_fixture, purchase_fixture, TestHarness,
    };

    fn access_query(plugin_id: Uuid, tenant_id: Uuid, subscriber: Option<Uuid>) -> AccessQuery {
        AccessQuery {
            plugin_id,
            tenant_id,
            organization_id: None,
            subscriber_id: subscriber,
            role_ids: Vec::new(),
        }
    }

    // -- purchase ---------------------------------------------------------

    #[tokio::test]
    async fn no_plan_purchase_is_personal_and_immediate() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.scope = PluginScope::Tenant;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        assert_eq!(sub.scope, PluginScope::User);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date, None);
        assert_eq!(sub.plan_id, None);
    }

    #[tokio::test]
    async fn free_plan_purchase_keeps_requested_scope() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut plan = plan_fixture(plugin, BillingPeriod::Monthly);
        plan.is_free = true;
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);
        cmd.scope = PluginScope::Tenant;
        cmd.subscriber_id = None;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        assert_eq!(sub.scope, PluginScope::Tenant);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan_id, Some(plan.id));
    }

    #[tokio::test]
    async fn trial_purchase_sets_trial_window() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut plan = plan_fixture(plugin, BillingPeriod::Monthly);
        plan.has_trial = true;
        plan.trial_days = Some(14);
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);

        let before = Utc::now();
        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        let after = Utc::now();

        assert_eq!(sub.status, SubscriptionStatus::Trial);
        let end = sub.end_date.unwrap();
        assert!(end >= before + chrono::Duration::days(14));
        assert!(end <= after + chrono::Duration::days(14) + chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn paid_monthly_purchase_is_pending_with_monthly_horizon() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let plan = plan_fixture(plugin, BillingPeriod::Monthly);
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);
        cmd.payment_method = Some("card".to_owned());

        let before = Utc::now();
        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        let after = Utc::now();

        assert_eq!(sub.status, SubscriptionStatus::Pending);
        assert_eq!(sub.payment_method.as_deref(), Some("card"));
        let end = sub.end_date.unwrap();
        assert!(end >= before + Months::new(1));
        assert!(end <= after + Months::new(1) + chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn purchase_validates_scope_requirements() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.scope = PluginScope::Organization;
        cmd.organization_id = None;
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.scope = PluginScope::User;
        cmd.subscriber_id = None;
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        // a plan-less grant is forced to user scope, so it needs a subscriber
        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.scope = PluginScope::Tenant;
        cmd.subscriber_id = None;
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
        assert_eq!(h.store.subscription_count(), 0);
    }

    #[tokio::test]
    async fn purchase_rejects_unknown_inactive_or_foreign_plans() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(Uuid::new_v4());
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let mut inactive = plan_fixture(plugin, BillingPeriod::Monthly);
        inactive.is_active = false;
        h.store.seed_plan(inactive.clone());
        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(inactive.id);
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let foreign = plan_fixture(Uuid::new_v4(), BillingPeriod::Monthly);
        h.store.seed_plan(foreign.clone());
        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(foreign.id);
        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn second_purchase_for_live_key_conflicts() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let cmd = purchase_fixture(plugin, tenant);
        h.subscriptions.purchase(cmd.clone()).await.unwrap();

        let err = h.subscriptions.purchase(cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(h.store.subscription_count(), 1);
    }

    #[tokio::test]
    async fn terminal_subscription_is_replaced_by_new_purchase() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let cmd = purchase_fixture(plugin, tenant);
        let first = h.subscriptions.purchase(cmd.clone()).await.unwrap();
        h.subscriptions.cancel(first.id, None).await.unwrap();

        let second = h.subscriptions.purchase(cmd).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(h.store.subscription_count(), 1);
        assert_eq!(
            h.subscriptions.get(second.id).await.unwrap().status,
            SubscriptionStatus::Active
        );
        assert!(matches!(
            h.subscriptions.get(first.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn promo_code_is_stashed_in_metadata() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.promo_code = Some("WELCOME10".to_owned());
        let mut extra = plugin_registry_sdk::models::Metadata::new();
        extra.insert("source".to_owned(), serde_json::json!("marketplace"));
        cmd.metadata = Some(extra);

        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        let metadata = sub.metadata.unwrap();

        assert_eq!(metadata.get(PROMO_CODE_KEY), Some(&serde_json::json!("WELCOME10")));
        assert_eq!(metadata.get("source"), Some(&serde_json::json!("marketplace")));
    }

    // -- enablement -------------------------------------------------------

    #[tokio::test]
    async fn find_or_create_is_idempotent_and_keeps_quotas() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut plan = plan_fixture(plugin, BillingPeriod::Monthly);
        plan.is_free = true;
        plan.has_limitations = true;
        let mut limitations = plugin_registry_sdk::models::Metadata::new();
        limitations.insert("maxActiveUsers".to_owned(), serde_json::json!(5));
        limitations.insert("maxInstallations".to_owned(), serde_json::json!(10));
        plan.limitations = Some(limitations);
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);
        let first = h.subscriptions.purchase(cmd.clone()).await.unwrap();

        let enablement = h.enablements.get(first.plugin_tenant_id).await.unwrap();
        assert_eq!(enablement.max_active_users, Some(5));
        assert_eq!(enablement.max_installations, Some(10));

        // an administrator tightens the quota; a repeat purchase must not reset it
        let mut edited = enablement.clone();
        edited.max_active_users = Some(2);
        h.store.put_enablement(edited);

        h.subscriptions.cancel(first.id, None).await.unwrap();
        let second = h.subscriptions.purchase(cmd).await.unwrap();

        assert_eq!(second.plugin_tenant_id, enablement.id);
        let after = h.enablements.get(enablement.id).await.unwrap();
        assert_eq!(after.max_active_users, Some(2));
        assert_eq!(h.store.enablement_count(), 1);
    }

    #[tokio::test]
    async fn quota_hints_apply_only_when_plan_has_limitations() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut plan = plan_fixture(plugin, BillingPeriod::Monthly);
        let mut limitations = plugin_registry_sdk::models::Metadata::new();
        limitations.insert("maxActiveUsers".to_owned(), serde_json::json!(5));
        plan.limitations = Some(limitations);
        // has_limitations stays false, so the hint map is ignored
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);
        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let enablement = h.enablements.get(sub.plugin_tenant_id).await.unwrap();
        assert_eq!(enablement.max_active_users, None);
    }

    #[tokio::test]
    async fn administrative_create_is_strict() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let cmd = CreateTenantEnablement {
            plugin_id: plugin,
            tenant_id: tenant,
            organization_id: None,
            scope: PluginScope::Tenant,
            enabled: true,
            auto_install: false,
            requires_approval: true,
            is_mandatory: false,
            max_installations: Some(3),
            max_active_users: None,
            tenant_configuration: None,
            preferences: None,
            allowed_role_ids: Vec::new(),
            allowed_user_ids: Vec::new(),
            denied_user_ids: Vec::new(),
        };

        let created = h.enablements.create(cmd.clone()).await.unwrap();
        assert_eq!(created.max_installations, Some(3));

        let err = h.enablements.create(cmd.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));

        h.store.set_known_plugins(vec![plugin]);
        let mut unknown = cmd;
        unknown.plugin_id = Uuid::new_v4();
        unknown.tenant_id = Uuid::new_v4();
        let err = h.enablements.create(unknown).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn usage_counters_saturate_at_zero() {
        let h = TestHarness::new();
        let record = enablement_fixture(Uuid::new_v4(), Uuid::new_v4());
        h.store.put_enablement(record.clone());

        h.enablements
            .record_usage(record.id, UsageAction::Uninstall)
            .await
            .unwrap();
        let after = h
            .enablements
            .record_usage(record.id, UsageAction::Install)
            .await
            .unwrap();

        assert_eq!(after.current_installations, 1);
    }

    // -- lifecycle transitions -------------------------------------------

    #[tokio::test]
    async fn activate_restarts_billing_horizon_from_plan() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let plan = plan_fixture(plugin, BillingPeriod::Yearly);
        h.store.seed_plan(plan.clone());

        let mut cmd = purchase_fixture(plugin, tenant);
        cmd.plan_id = Some(plan.id);
        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);

        let before = Utc::now();
        let active = h.subscriptions.activate(sub.id).await.unwrap();

        assert_eq!(active.status, SubscriptionStatus::Active);
        assert!(active.end_date.unwrap() >= before + Months::new(12));
    }

    #[tokio::test]
    async fn cancel_stamps_reason_and_timestamp() {
        let h = TestHarness::new();
        let sub = h
            .subscriptions
            .purchase(purchase_fixture(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let cancelled = h
            .subscriptions
            .cancel(sub.id, Some("too expensive".to_owned()))
            .await
            .unwrap();

        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("too expensive"));
    }

    #[tokio::test]
    async fn illegal_transitions_are_rejected() {
        let h = TestHarness::new();
        let sub = h
            .subscriptions
            .purchase(purchase_fixture(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        // active -> active is not a transition
        let err = h.subscriptions.activate(sub.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));

        let expired = h.subscriptions.expire(sub.id).await.unwrap();
        assert_eq!(expired.status, SubscriptionStatus::Expired);

        let err = h.subscriptions.cancel(sub.id, None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    // -- entitlement ------------------------------------------------------

    #[tokio::test]
    async fn live_subscription_grants_access() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, subscriber))
            .await
            .unwrap();

        assert!(decision.has_access);
        assert_eq!(decision.subscription.map(|s| s.id), Some(sub.id));
    }

    #[tokio::test]
    async fn denied_user_never_passes_even_with_live_subscription() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id.unwrap();

        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let mut enablement = h.enablements.get(sub.plugin_tenant_id).await.unwrap();
        enablement.denied_user_ids.push(subscriber);
        h.store.put_enablement(enablement);
        h.cache.invalidate_plugin_tenant(plugin, tenant);

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, Some(subscriber)))
            .await
            .unwrap();

        assert!(!decision.has_access);
        assert!(decision
            .denial_reasons
            .iter()
            .any(|r| r.contains("denied")));
        assert_eq!(
            h.entitlements
                .find_active_subscription(&access_query(plugin, tenant, Some(subscriber)))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn tenant_wide_enablement_grants_without_subscription() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        h.store.put_enablement(enablement_fixture(plugin, tenant));

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, Some(Uuid::new_v4())))
            .await
            .unwrap();

        assert!(decision.has_access);
        assert_eq!(decision.subscription, None);
    }

    #[tokio::test]
    async fn disabled_or_unapproved_enablement_denies() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut record = enablement_fixture(plugin, tenant);
        record.enabled = false;
        h.store.put_enablement(record.clone());

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, None))
            .await
            .unwrap();
        assert!(!decision.has_access);

        record.enabled = true;
        record.requires_approval = true;
        h.store.put_enablement(record.clone());
        h.cache.invalidate_plugin_tenant(plugin, tenant);

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, None))
            .await
            .unwrap();
        assert!(!decision.has_access);

        h.enablements
            .approve(record.id, Uuid::new_v4())
            .await
            .unwrap();

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, None))
            .await
            .unwrap();
        assert!(decision.has_access);
    }

    #[tokio::test]
    async fn most_specific_scope_wins() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();

        // organization-scope purchase by an admin
        let mut org_cmd = purchase_fixture(plugin, tenant);
        org_cmd.scope = PluginScope::Organization;
        org_cmd.organization_id = Some(org);
        org_cmd.subscriber_id = None;
        let mut plan = plan_fixture(plugin, BillingPeriod::Monthly);
        plan.is_free = true;
        h.store.seed_plan(plan.clone());
        org_cmd.plan_id = Some(plan.id);
        let org_sub = h.subscriptions.purchase(org_cmd).await.unwrap();

        // personal purchase by the user in the same organization
        let mut user_cmd = purchase_fixture(plugin, tenant);
        user_cmd.organization_id = Some(org);
        user_cmd.subscriber_id = Some(user);
        let user_sub = h.subscriptions.purchase(user_cmd).await.unwrap();

        let mut query = access_query(plugin, tenant, Some(user));
        query.organization_id = Some(org);
        let governing = h
            .entitlements
            .find_active_subscription(&query)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(governing.id, user_sub.id);

        // a colleague without a personal subscription falls back to the org grant
        let mut colleague = access_query(plugin, tenant, Some(Uuid::new_v4()));
        colleague.organization_id = Some(org);
        let governing = h
            .entitlements
            .find_active_subscription(&colleague)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(governing.id, org_sub.id);
    }

    #[tokio::test]
    async fn exhausted_user_quota_denies() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let mut record = enablement_fixture(plugin, tenant);
        record.max_active_users = Some(1);
        record.current_active_users = 1;
        h.store.put_enablement(record);

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, Some(Uuid::new_v4())))
            .await
            .unwrap();

        assert!(!decision.has_access);
        assert!(decision.denial_reasons.iter().any(|r| r.contains("quota")));
    }

    #[tokio::test]
    async fn expired_end_date_disqualifies_live_status() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let mut stale = sub;
        stale.end_date = Some(Utc::now() - chrono::Duration::days(1));
        h.store.put_subscription(stale);
        h.cache.invalidate_plugin_tenant(plugin, tenant);

        let decision = h
            .entitlements
            .check_access(&access_query(plugin, tenant, subscriber))
            .await
            .unwrap();

        assert!(!decision.has_access);
    }

    // -- revocation -------------------------------------------------------

    #[tokio::test]
    async fn revoking_non_approver_removes_only_their_grant() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let approver = Uuid::new_v4();

        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id.unwrap();
        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let other = h
            .subscriptions
            .purchase(purchase_fixture(plugin, tenant))
            .await
            .unwrap();

        let mut enablement = h.enablements.get(sub.plugin_tenant_id).await.unwrap();
        enablement.approved_by_id = Some(approver);
        enablement.allowed_user_ids = vec![subscriber];
        h.store.put_enablement(enablement.clone());

        let outcome = h.revocations.revoke(sub.id).await.unwrap();

        assert!(!outcome.enablement_deleted);
        assert_eq!(outcome.subscriptions_deleted, 1);
        let after = h.enablements.get(enablement.id).await.unwrap();
        assert!(after.allowed_user_ids.is_empty());
        // the other subscriber's grant survives
        assert!(h.subscriptions.get(other.id).await.is_ok());
    }

    #[tokio::test]
    async fn revoking_the_approver_requires_the_cascading_call() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let cmd = purchase_fixture(plugin, tenant);
        let approver = cmd.subscriber_id.unwrap();
        let sub = h.subscriptions.purchase(cmd).await.unwrap();

        let other = h
            .subscriptions
            .purchase(purchase_fixture(plugin, tenant))
            .await
            .unwrap();

        let mut enablement = h.enablements.get(sub.plugin_tenant_id).await.unwrap();
        enablement.approved_by_id = Some(approver);
        h.store.put_enablement(enablement.clone());

        let err = h.revocations.revoke(sub.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(h.store.subscription_count(), 2);

        let outcome = h.revocations.revoke_cascading(sub.id).await.unwrap();

        assert!(outcome.enablement_deleted);
        assert_eq!(outcome.subscriptions_deleted, 2);
        assert_eq!(h.store.subscription_count(), 0);
        assert_eq!(h.store.enablement_count(), 0);
        assert!(h.subscriptions.get(other.id).await.is_err());
    }

    #[tokio::test]
    async fn offboarding_revokes_across_the_tenant() {
        let h = TestHarness::new();
        let tenant = Uuid::new_v4();
        let subscriber = Uuid::new_v4();

        let mut first = purchase_fixture(Uuid::new_v4(), tenant);
        first.subscriber_id = Some(subscriber);
        let first_sub = h.subscriptions.purchase(first).await.unwrap();

        let mut second = purchase_fixture(Uuid::new_v4(), tenant);
        second.subscriber_id = Some(subscriber);
        h.subscriptions.purchase(second).await.unwrap();

        // an allowed-listing with no subscription in the same tenant
        let mut listed = enablement_fixture(Uuid::new_v4(), tenant);
        listed.allowed_user_ids = vec![subscriber];
        h.store.put_enablement(listed.clone());

        // a subscription in another tenant stays untouched
        let mut foreign = purchase_fixture(first_sub.plugin_id, Uuid::new_v4());
        foreign.subscriber_id = Some(subscriber);
        let foreign_sub = h.subscriptions.purchase(foreign).await.unwrap();

        let outcome = h
            .revocations
            .offboard_subscriber(tenant, subscriber)
            .await
            .unwrap();

        assert_eq!(outcome.subscriptions_deleted, 2);
        assert!(h.subscriptions.get(foreign_sub.id).await.is_ok());
        let after = h.enablements.get(listed.id).await.unwrap();
        assert!(after.allowed_user_ids.is_empty());
    }

    // -- cache ------------------------------------------------------------

    #[tokio::test]
    async fn writes_invalidate_cached_decisions() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        let query = access_query(plugin, tenant, subscriber);

        assert!(h.entitlements.check_access(&query).await.unwrap().has_access);

        h.subscriptions.cancel(sub.id, None).await.unwrap();

        assert!(!h.entitlements.check_access(&query).await.unwrap().has_access);
    }

    #[tokio::test]
    async fn decisions_are_served_from_cache_until_invalidated() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let cmd = purchase_fixture(plugin, tenant);
        let subscriber = cmd.subscriber_id;

        let sub = h.subscriptions.purchase(cmd).await.unwrap();
        let query = access_query(plugin, tenant, subscriber);

        assert!(h.entitlements.check_access(&query).await.unwrap().has_access);

        // mutate storage behind the cache's back: the stale grant is served
        // until something invalidates the key
        let mut stale = sub;
        stale.status = SubscriptionStatus::Cancelled;
        h.store.put_subscription(stale);

        assert!(h.entitlements.check_access(&query).await.unwrap().has_access);

        h.cache.invalidate_plugin_tenant(plugin, tenant);
        assert!(!h.entitlements.check_access(&query).await.unwrap().has_access);
    }

    #[tokio::test]
    async fn user_list_management_moves_users_between_lists() {
        let h = TestHarness::new();
        let record = enablement_fixture(Uuid::new_v4(), Uuid::new_v4());
        let user = Uuid::new_v4();
        h.store.put_enablement(record.clone());

        let after = h
            .enablements
            .manage_users(record.id, &[user], UserListOp::Allow)
            .await
            .unwrap();
        assert!(after.allowed_user_ids.contains(&user));

        let after = h
            .enablements
            .manage_users(record.id, &[user], UserListOp::Deny)
            .await
            .unwrap();
        assert!(!after.allowed_user_ids.contains(&user));
        assert!(after.denied_user_ids.contains(&user));

        let after = h
            .enablements
            .manage_users(record.id, &[user], UserListOp::Remove)
            .await
            .unwrap();
        assert!(after.denied_user_ids.is_empty());
        assert!(after.allowed_user_ids.is_empty());
    }

    #[tokio::test]
    async fn remove_allowed_user_is_a_noop_when_absent() {
        let h = TestHarness::new();
        let record = enablement_fixture(Uuid::new_v4(), Uuid::new_v4());
        h.store.put_enablement(record.clone());

        let after = h
            .enablements
            .remove_allowed_user(record.id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(after.updated_at, record.updated_at);
    }

    #[tokio::test]
    async fn explicit_cascade_deletes_enablement_and_subscriptions() {
        let h = TestHarness::new();
        let plugin = Uuid::new_v4();
        let tenant = Uuid::new_v4();

        let first = h
            .subscriptions
            .purchase(purchase_fixture(plugin, tenant))
            .await
            .unwrap();
        h.subscriptions
            .purchase(purchase_fixture(plugin, tenant))
            .await
            .unwrap();

        let outcome = h
            .enablements
            .revoke_and_cascade(first.plugin_tenant_id)
            .await
            .unwrap();

        assert!(outcome.enablement_deleted);
        assert_eq!(outcome.subscriptions_deleted, 2);
        assert_eq!(h.store.subscription_count(), 0);
    }
}
